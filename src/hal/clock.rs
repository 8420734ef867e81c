//! Prescaler and compare-target arithmetic for the timer/counters
//!
//! A channel ticks at `clock / (prescaler * compare)`. Given a desired
//! [`Rate`] the selector walks the prescaler menu, rounds the compare target
//! for each divisor and keeps the pair whose actual frequency lands closest to
//! the request. The rounding error is kept visible through
//! [`actual_millihertz`] so it can be reported at startup.

use crate::error::ConfigError;

/// Clock select codes shared by TC0, TC1 and TC3 (`CSn2:0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Prescaler {
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

impl Prescaler {
    /// Every divisor the hardware offers, smallest first
    pub const ALL: [Prescaler; 5] = [
        Prescaler::Direct,
        Prescaler::Div8,
        Prescaler::Div64,
        Prescaler::Div256,
        Prescaler::Div1024,
    ];

    #[inline]
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Direct => 1,
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
            Prescaler::Div256 => 256,
            Prescaler::Div1024 => 1024,
        }
    }

    /// Value for the `CSn2:0` field
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Width of a timer's compare register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerWidth {
    Bits8,
    Bits16,
}

impl TimerWidth {
    /// Largest compare target; the register then holds `max_compare() - 1`
    #[inline]
    pub const fn max_compare(self) -> u32 {
        match self {
            TimerWidth::Bits8 => u8::MAX as u32 + 1,
            TimerWidth::Bits16 => u16::MAX as u32 + 1,
        }
    }
}

/// A requested tick or toggle rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {
    Hertz(u32),
    PeriodMicros(u32),
}

impl Rate {
    pub const fn hertz(hz: u32) -> Self {
        Rate::Hertz(hz)
    }

    pub const fn period_us(us: u32) -> Self {
        Rate::PeriodMicros(us)
    }

    /// Fails when the period does not fit in microseconds
    pub const fn period_ms(ms: u32) -> Result<Self, ConfigError> {
        match ms.checked_mul(1000) {
            Some(us) => Ok(Rate::PeriodMicros(us)),
            None => Err(ConfigError::OutOfRange),
        }
    }

    pub const fn is_zero(self) -> bool {
        match self {
            Rate::Hertz(hz) => hz == 0,
            Rate::PeriodMicros(us) => us == 0,
        }
    }

    /// `(a, b)` with the desired frequency equal to `b / a` Hz
    #[inline]
    fn as_ratio(self) -> (u64, u64) {
        match self {
            Rate::Hertz(hz) => (1, hz as u64),
            Rate::PeriodMicros(us) => (us as u64, 1_000_000),
        }
    }
}

#[inline]
fn div_round(num: u64, den: u64) -> u64 {
    (num + den / 2) / den
}

/// Compare target for `rate` at `prescaler`, rounded half up and unbounded
pub fn compare_for(clock_hz: u32, rate: Rate, prescaler: Prescaler) -> u64 {
    let (a, b) = rate.as_ratio();
    // compare = clock / (prescaler * f) = clock * a / (prescaler * b)
    div_round(clock_hz as u64 * a, prescaler.divisor() as u64 * b)
}

/// Frequency actually produced by a prescaler/compare pair, in millihertz
pub fn actual_millihertz(clock_hz: u32, prescaler: Prescaler, compare: u32) -> u64 {
    let divisor = prescaler.divisor() as u64 * compare.max(1) as u64;
    div_round(clock_hz as u64 * 1000, divisor)
}

/// Period actually produced by a prescaler/compare pair, in microseconds
pub fn period_us(clock_hz: u32, prescaler: Prescaler, compare: u32) -> u64 {
    let divisor = prescaler.divisor() as u64 * compare as u64;
    div_round(divisor * 1_000_000, clock_hz.max(1) as u64)
}

// Frequency error of a candidate, as a fraction num / den. The request's own
// denominator is shared by every candidate and left out.
fn error_terms(clock_hz: u32, rate: Rate, prescaler: Prescaler, compare: u64) -> (u128, u128) {
    let (a, b) = rate.as_ratio();
    let ticks = prescaler.divisor() as u128 * compare as u128;
    let produced = clock_hz as u128 * a as u128;
    let wanted = b as u128 * ticks;
    (produced.abs_diff(wanted), ticks)
}

/// Pick the prescaler/compare pair that best approximates `rate`
///
/// Ties go to the smaller prescaler, which keeps the finer counter resolution.
pub fn select(clock_hz: u32, rate: Rate, width: TimerWidth) -> Result<(Prescaler, u32), ConfigError> {
    if rate.is_zero() || clock_hz == 0 {
        return Err(ConfigError::ZeroRate);
    }

    let max = width.max_compare() as u64;
    let mut best: Option<(Prescaler, u32, u128, u128)> = None;

    for prescaler in Prescaler::ALL {
        let compare = compare_for(clock_hz, rate, prescaler);
        if compare == 0 || compare > max {
            continue;
        }

        let (num, den) = error_terms(clock_hz, rate, prescaler, compare);
        let better = match best {
            Some((_, _, best_num, best_den)) => num * best_den < best_num * den,
            None => true,
        };
        if better {
            best = Some((prescaler, compare as u32, num, den));
        }
    }

    best.map(|(prescaler, compare, _, _)| (prescaler, compare))
        .ok_or(ConfigError::OutOfRange)
}
