//! Compare-match handler table and the state it maintains

use crate::config::{RED_PERIOD_MS, Y_TIMER_RESOLUTION_MS, YELLOW_PERIOD_MS};
use crate::rtos::shared::{InterruptContext, Period, PeriodParameter, ReleaseFlag, TickCounter};
use crate::rtos::Channel;

const DEFAULT_RED_PERIOD: Period = match Period::new(RED_PERIOD_MS) {
    Some(period) => period,
    None => panic!("RED_PERIOD_MS must be non-zero"),
};

const DEFAULT_YELLOW_PERIOD: Period = match Period::new(yellow_ticks(YELLOW_PERIOD_MS)) {
    Some(period) => period,
    None => panic!("yellow period must be non-zero"),
};

/// Yellow ticks in a period given in milliseconds, at least one
pub const fn yellow_ticks(period_ms: u16) -> u16 {
    let ticks = period_ms / Y_TIMER_RESOLUTION_MS;
    if ticks == 0 {
        1
    } else {
        ticks
    }
}

/// What the interrupt vector should do after a handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerAction {
    None,
    /// Flip the channel's software-driven LED
    ToggleLed,
}

/// Everything the handlers write and the main loop reads
pub struct Schedule {
    /// 1 kHz software clock
    pub ms_ticks: TickCounter,
    pub yellow_ticks: TickCounter,
    /// Number of hardware toggles of OC1A
    pub green_toggles: TickCounter,
    /// Raised every `red_period` ms ticks
    pub release_red: ReleaseFlag,
    pub red_period: PeriodParameter,
    /// In yellow ticks, not milliseconds
    pub yellow_period: PeriodParameter,
}

impl Schedule {
    pub const fn new() -> Self {
        Self {
            ms_ticks: TickCounter::new(),
            yellow_ticks: TickCounter::new(),
            green_toggles: TickCounter::new(),
            release_red: ReleaseFlag::new(),
            red_period: PeriodParameter::new(DEFAULT_RED_PERIOD),
            yellow_period: PeriodParameter::new(DEFAULT_YELLOW_PERIOD),
        }
    }

    /// Zero a channel's bookkeeping before its interrupt is unmasked
    pub(crate) fn reset(&self, channel: Channel) {
        match channel {
            Channel::Red => {
                self.ms_ticks.reset();
                self.release_red.clear();
            }
            Channel::Yellow => self.yellow_ticks.reset(),
            Channel::Green => self.green_toggles.reset(),
        }
    }

    /// Level of OC1A, assuming it started low
    pub fn green_lit(&self) -> bool {
        self.green_toggles.read() % 2 == 1
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// The firmware's one instance, shared with the interrupt vectors
pub static SCHEDULE: Schedule = Schedule::new();

pub type Handler = fn(&Schedule, &InterruptContext<'_>) -> HandlerAction;

fn on_red_tick(schedule: &Schedule, ctx: &InterruptContext<'_>) -> HandlerAction {
    let ticks = schedule.ms_ticks.advance(ctx);
    if schedule.red_period.get_in(ctx).divides(ticks) {
        schedule.release_red.raise(ctx);
    }
    HandlerAction::None
}

fn on_yellow_tick(schedule: &Schedule, ctx: &InterruptContext<'_>) -> HandlerAction {
    let ticks = schedule.yellow_ticks.advance(ctx);
    if schedule.yellow_period.get_in(ctx).divides(ticks) {
        HandlerAction::ToggleLed
    } else {
        HandlerAction::None
    }
}

fn on_green_match(schedule: &Schedule, ctx: &InterruptContext<'_>) -> HandlerAction {
    // OC1A has already been flipped by the timer
    schedule.green_toggles.advance(ctx);
    HandlerAction::None
}

/// Indexed by [`Channel::index`]
pub const HANDLERS: [Handler; Channel::COUNT] = [on_red_tick, on_yellow_tick, on_green_match];

/// Run the handler for `channel`
///
/// Called from the compare-match vectors, or from a simulated event source on
/// the host. The handler runs with interrupts disabled, so it cannot be
/// re-entered for its own channel.
#[inline]
pub fn dispatch(schedule: &Schedule, channel: Channel) -> HandlerAction {
    critical_section::with(|cs| {
        let ctx = InterruptContext::new(cs);
        HANDLERS[channel.index()](schedule, &ctx)
    })
}
