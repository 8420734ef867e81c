//! Interrupt-driven scheduling for the three timing channels

pub mod scheduler;
pub mod shared;
pub mod timers;

pub use scheduler::{dispatch, HandlerAction, Schedule, SCHEDULE};
pub use shared::{InterruptContext, Period, PeriodParameter, ReleaseFlag, TickCounter};
pub use timers::{Settings, TimerPlan};

/// One hardware timer and the LED it schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// TC0, 1 kHz software clock; main loop toggles on release
    Red,
    /// TC3, 10 Hz; handler decides the toggle
    Yellow,
    /// TC1, OC1A toggled by hardware
    Green,
}

impl Channel {
    pub const COUNT: usize = 3;
    pub const ALL: [Channel; Channel::COUNT] = [Channel::Red, Channel::Yellow, Channel::Green];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Yellow => "yellow",
            Channel::Green => "green",
        }
    }
}
