//! Startup report of what each timer was actually programmed to
//!
//! Integer rounding means a channel rarely runs at exactly the requested
//! rate; these lines show the real prescaler, compare target, frequency and
//! period. Output problems never reach the caller.

use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use crate::error::SetupError;
use crate::hal::{ChannelConfig, CountingMode};
use crate::logger::{Level, Logger};
use crate::rtos::{Channel, TimerPlan};

/// Millihertz rendered as `H.mmm`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Millihertz(pub u64);

impl uDisplay for Millihertz {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        let whole = self.0 / 1000;
        let frac = self.0 % 1000;
        uDisplay::fmt(&whole, f)?;
        f.write_str(".")?;
        if frac < 100 {
            f.write_str("0")?;
        }
        if frac < 10 {
            f.write_str("0")?;
        }
        uDisplay::fmt(&frac, f)
    }
}

fn mode_tag(mode: CountingMode) -> &'static str {
    match mode {
        CountingMode::ResetOnCompare => "sw",
        CountingMode::ToggleOnCompare => "hw toggle",
    }
}

/// One line describing a configured channel
pub fn report_channel<W: uWrite>(log: &mut Logger<W>, channel: Channel, config: &ChannelConfig, clock_hz: u32) {
    let freq = Millihertz(config.actual_millihertz(clock_hz));
    let period = config.period_us(clock_hz);
    log.log(Level::Info, |w| {
        uwrite!(
            w,
            "{} clock ({}): prescaler {}, compare {}, {} Hz (period {} us)",
            channel.name(),
            mode_tag(config.mode()),
            config.prescaler().divisor(),
            config.compare(),
            freq,
            period
        )
    });
}

/// Every channel plus the periods the handlers will use
pub fn report_plan<W: uWrite>(log: &mut Logger<W>, plan: &TimerPlan, clock_hz: u32) {
    for channel in Channel::ALL {
        report_channel(log, channel, plan.channel(channel), clock_hz);
    }
    log.log(Level::Info, |w| {
        uwrite!(
            w,
            "red release every {} ticks, yellow toggle every {} ticks",
            plan.red_period.get(),
            plan.yellow_period.get()
        )
    });
}

pub fn report_setup_error<W: uWrite>(log: &mut Logger<W>, err: &SetupError) {
    log.log(Level::Error, |w| uwrite!(w, "timer setup failed: {}", *err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::hal::{Prescaler, TimerWidth};
    use crate::logger::tests::{Capture, Flaky};
    use crate::rtos::Settings;

    const CLOCK: u32 = 20_000_000;

    fn render(value: Millihertz) -> String {
        let mut out = Capture::default();
        uwrite!(&mut out, "{}", value).unwrap();
        out.0
    }

    #[test]
    fn millihertz_pads_fraction() {
        assert_eq!(render(Millihertz(10_006)), "10.006");
        assert_eq!(render(Millihertz(1_001_603)), "1001.603");
        assert_eq!(render(Millihertz(2_050)), "2.050");
        assert_eq!(render(Millihertz(999)), "0.999");
    }

    #[test]
    fn yellow_line_shows_actual_rate() {
        let config = ChannelConfig::builder(TimerWidth::Bits16)
            .pair(Prescaler::Div1024, 1952)
            .build(CLOCK)
            .unwrap();
        let mut log = Logger::with_level(Capture::default(), Level::Info);
        report_channel(&mut log, Channel::Yellow, &config, CLOCK);
        assert_eq!(
            log.sink().0,
            "[INF] yellow clock (sw): prescaler 1024, compare 1952, 10.006 Hz (period 99942 us)\r\n"
        );
    }

    #[test]
    fn plan_report_covers_all_channels() {
        let plan = TimerPlan::compute(CLOCK, &Settings::default()).unwrap();
        let mut log = Logger::with_level(Capture::default(), Level::Info);
        report_plan(&mut log, &plan, CLOCK);

        let text = log.into_inner().0;
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("red clock (sw): prescaler 256, compare 78, 1001.603 Hz"));
        assert!(text.contains("green clock (hw toggle)"));
        assert!(text.contains("release every 500 ticks"));
    }

    #[test]
    fn broken_sink_does_not_stop_reporting() {
        let plan = TimerPlan::compute(CLOCK, &Settings::default()).unwrap();
        let mut log = Logger::with_level(Flaky { budget: 0, text: String::new() }, Level::Info);
        report_plan(&mut log, &plan, CLOCK);
        assert_eq!(log.dropped(), 4);
    }

    #[test]
    fn setup_error_line() {
        let mut log = Logger::with_level(Capture::default(), Level::Info);
        report_setup_error(&mut log, &SetupError::new(Channel::Red, ConfigError::ZeroRate));
        assert_eq!(
            log.sink().0,
            "[ERR] timer setup failed: red channel: zero frequency or period\r\n"
        );
    }
}
