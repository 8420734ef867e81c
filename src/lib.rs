//! Three LEDs scheduled by three independent compare timers on an ATmega1284P
//!
//! * red: TC0 drives a 1 kHz software clock; its handler raises a release flag
//!   every `red_period` ticks and the main loop does the toggle.
//! * yellow: TC3 ticks at 10 Hz; its handler decides when the LED flips.
//! * green: TC1 toggles OC1A in hardware; the handler only counts matches.
//!
//! Everything outside the `avr`-only register glue builds on the host, where
//! [`sim::MockTimerSource`] stands in for the interrupt vectors.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod hal;
pub mod logger;
pub mod rtos;
pub mod sim;

pub use error::{ConfigError, SetupError};
pub use rtos::{dispatch, Channel, HandlerAction, Schedule, Settings, TimerPlan, SCHEDULE};
