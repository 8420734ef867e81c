pub mod clock;
pub mod timer;

#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod uart;

// Re-export commonly used types
pub use clock::{Prescaler, Rate, TimerWidth};
pub use timer::{program, ChannelBuilder, ChannelConfig, CountingMode, RegisterImage, TimerRegisters};
#[cfg(target_arch = "avr")]
pub use uart::Uart;
