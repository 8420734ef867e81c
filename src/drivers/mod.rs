pub mod led;
#[cfg(target_arch = "avr")]
pub mod serial_console;

pub use led::SoftLed;
#[cfg(target_arch = "avr")]
pub use serial_console::SerialConsole;
