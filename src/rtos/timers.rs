//! Startup configuration of the three timing channels
//!
//! | channel | timer | mode              | rate                         |
//! |---------|-------|-------------------|------------------------------|
//! | red     | TC0   | reset on compare  | 1 kHz                        |
//! | yellow  | TC3   | reset on compare  | 10 Hz (100 ms resolution)    |
//! | green   | TC1   | toggle on compare | one toggle per half period   |

use crate::config::{GREEN_PERIOD_MS, MS_TICK_HZ, RED_PERIOD_MS, Y_TIMER_RESOLUTION_MS, YELLOW_PERIOD_MS};
use crate::error::{ConfigError, SetupError};
use crate::hal::timer::{program, ChannelConfig, CountingMode, TimerRegisters};
use crate::hal::{Rate, TimerWidth};
use crate::rtos::scheduler::{yellow_ticks, Schedule};
use crate::rtos::{Channel, Period};

/// Per-channel periods, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Red toggle period, in 1 ms ticks
    pub red_period_ms: u16,
    /// Yellow toggle period, rounded down to the 100 ms resolution
    pub yellow_period_ms: u16,
    /// Full green blink period, two hardware toggles
    pub green_period_ms: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            red_period_ms: RED_PERIOD_MS,
            yellow_period_ms: YELLOW_PERIOD_MS,
            green_period_ms: GREEN_PERIOD_MS,
        }
    }
}

/// Validated configuration for all channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPlan {
    pub red: ChannelConfig,
    pub yellow: ChannelConfig,
    pub green: ChannelConfig,
    pub red_period: Period,
    pub yellow_period: Period,
}

impl TimerPlan {
    pub fn compute(clock_hz: u32, settings: &Settings) -> Result<Self, SetupError> {
        let red_period = Period::new(settings.red_period_ms)
            .ok_or(SetupError::new(Channel::Red, ConfigError::ZeroRate))?;
        let yellow_period = match settings.yellow_period_ms {
            0 => return Err(SetupError::new(Channel::Yellow, ConfigError::ZeroRate)),
            ms => Period::new(yellow_ticks(ms))
                .ok_or(SetupError::new(Channel::Yellow, ConfigError::ZeroRate))?,
        };

        let red = ChannelConfig::builder(TimerWidth::Bits8)
            .mode(CountingMode::ResetOnCompare)
            .rate(Rate::hertz(MS_TICK_HZ))
            .build(clock_hz)
            .map_err(|cause| SetupError::new(Channel::Red, cause))?;

        let yellow = Rate::period_ms(Y_TIMER_RESOLUTION_MS as u32)
            .and_then(|rate| {
                ChannelConfig::builder(TimerWidth::Bits16)
                    .mode(CountingMode::ResetOnCompare)
                    .rate(rate)
                    .build(clock_hz)
            })
            .map_err(|cause| SetupError::new(Channel::Yellow, cause))?;

        // The pin flips on every match, so a match is due every half period
        let green = ChannelConfig::builder(TimerWidth::Bits16)
            .mode(CountingMode::ToggleOnCompare)
            .rate(Rate::period_us(settings.green_period_ms as u32 * 500))
            .build(clock_hz)
            .map_err(|cause| SetupError::new(Channel::Green, cause))?;

        Ok(Self {
            red,
            yellow,
            green,
            red_period,
            yellow_period,
        })
    }

    pub fn channel(&self, channel: Channel) -> &ChannelConfig {
        match channel {
            Channel::Red => &self.red,
            Channel::Yellow => &self.yellow,
            Channel::Green => &self.green,
        }
    }
}

/// Configure all three timers and arm their compare-match interrupts
///
/// Nothing is written to hardware unless every channel validates. Each
/// channel's bookkeeping is zeroed while its interrupt is masked, and OC1A is
/// driven low, so calling this again restarts every channel from a known
/// state.
pub fn start_timers<R, Y, G>(
    red: &mut R,
    yellow: &mut Y,
    green: &mut G,
    schedule: &Schedule,
    clock_hz: u32,
    settings: &Settings,
) -> Result<TimerPlan, SetupError>
where
    R: TimerRegisters,
    Y: TimerRegisters,
    G: TimerRegisters,
{
    let plan = TimerPlan::compute(clock_hz, settings)?;

    schedule.red_period.set(plan.red_period);
    schedule.yellow_period.set(plan.yellow_period);

    red.write_interrupt_mask(0);
    schedule.reset(Channel::Red);
    program(red, &plan.red.register_image());

    yellow.write_interrupt_mask(0);
    schedule.reset(Channel::Yellow);
    program(yellow, &plan.yellow.register_image());

    green.write_interrupt_mask(0);
    schedule.reset(Channel::Green);
    program(green, &plan.green.register_image());

    Ok(plan)
}
