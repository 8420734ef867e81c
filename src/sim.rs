//! Host-side stand-in for the compare-match vectors
//!
//! Feeds "channel fired" events through the same [`dispatch`] path the
//! hardware vectors use. Events can be injected one by one, or derived from a
//! span of CPU cycles and a channel's [`ChannelConfig`].

use crate::hal::ChannelConfig;
use crate::rtos::{dispatch, Channel, HandlerAction, Schedule};

/// Deterministic timer-event source bound to one [`Schedule`]
pub struct MockTimerSource<'a> {
    schedule: &'a Schedule,
    fired: [u32; Channel::COUNT],
    // Cycles since the last simulated match, per channel
    residue: [u64; Channel::COUNT],
}

impl<'a> MockTimerSource<'a> {
    pub fn new(schedule: &'a Schedule) -> Self {
        Self {
            schedule,
            fired: [0; Channel::COUNT],
            residue: [0; Channel::COUNT],
        }
    }

    /// One compare match on `channel`
    pub fn fire(&mut self, channel: Channel) -> HandlerAction {
        let slot = &mut self.fired[channel.index()];
        *slot = slot.wrapping_add(1);
        dispatch(self.schedule, channel)
    }

    /// `count` matches, calling `on_action` after each
    pub fn fire_n<F>(&mut self, channel: Channel, count: u32, mut on_action: F)
    where
        F: FnMut(HandlerAction),
    {
        for _ in 0..count {
            let action = self.fire(channel);
            on_action(action);
        }
    }

    /// Let `cycles` CPU cycles pass on a channel running `config`
    ///
    /// Returns how many matches fired. Leftover cycles carry into the next
    /// call, so splitting a span does not change the count.
    pub fn run_cycles<F>(&mut self, channel: Channel, config: &ChannelConfig, cycles: u64, mut on_action: F) -> u64
    where
        F: FnMut(HandlerAction),
    {
        let per_match = config.cycles_per_match() as u64;
        let total = self.residue[channel.index()] + cycles;
        let matches = total / per_match;
        self.residue[channel.index()] = total % per_match;

        for _ in 0..matches {
            let action = self.fire(channel);
            on_action(action);
        }
        matches
    }

    /// Matches injected on `channel` so far
    pub fn fired(&self, channel: Channel) -> u32 {
        self.fired[channel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{Prescaler, TimerWidth};

    #[test]
    fn split_spans_count_like_one_span() {
        let config = ChannelConfig::builder(TimerWidth::Bits16)
            .pair(Prescaler::Div8, 1000)
            .build(20_000_000)
            .unwrap();

        let whole = Schedule::new();
        let mut source = MockTimerSource::new(&whole);
        assert_eq!(source.run_cycles(Channel::Yellow, &config, 80_000, |_| {}), 10);

        let split = Schedule::new();
        let mut source = MockTimerSource::new(&split);
        let mut total = 0;
        for _ in 0..16 {
            total += source.run_cycles(Channel::Yellow, &config, 5_000, |_| {});
        }
        assert_eq!(total, 10);
        assert_eq!(source.fired(Channel::Yellow), 10);
        assert_eq!(split.yellow_ticks.read(), whole.yellow_ticks.read());
    }

    #[test]
    fn fire_n_reports_actions() {
        let schedule = Schedule::new();
        let mut source = MockTimerSource::new(&schedule);
        let mut toggles = 0;
        source.fire_n(Channel::Yellow, 25, |action| {
            if action == HandlerAction::ToggleLed {
                toggles += 1;
            }
        });
        // default yellow period is ten 100 ms ticks
        assert_eq!(toggles, 2);
    }
}
