//! State shared between compare-match handlers and the main loop
//!
//! Every field lives in a [`critical_section::Mutex`], so a 32-bit counter is
//! never observed half written on an 8-bit core. Writers that belong to
//! interrupt context take an [`InterruptContext`], which only the dispatcher
//! can create; the main loop gets read and clear access only.

use core::cell::Cell;
use core::num::NonZeroU16;

use critical_section::{CriticalSection, Mutex};

/// Proof that the caller is a compare-match handler running under dispatch
pub struct InterruptContext<'cs> {
    cs: CriticalSection<'cs>,
}

impl<'cs> InterruptContext<'cs> {
    pub(crate) fn new(cs: CriticalSection<'cs>) -> Self {
        Self { cs }
    }
}

/// Monotonic, wrapping tick count written only from interrupt context
pub struct TickCounter {
    count: Mutex<Cell<u32>>,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Count one match and return the new value
    #[inline]
    pub(crate) fn advance(&self, ctx: &InterruptContext<'_>) -> u32 {
        let cell = self.count.borrow(ctx.cs);
        let next = cell.get().wrapping_add(1);
        cell.set(next);
        next
    }

    /// Only used while the channel's interrupt is masked
    pub(crate) fn reset(&self) {
        critical_section::with(|cs| self.count.borrow(cs).set(0));
    }

    #[inline]
    pub fn read(&self) -> u32 {
        critical_section::with(|cs| self.count.borrow(cs).get())
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Raised by a handler, cleared by whoever acts on it
pub struct ReleaseFlag {
    raised: Mutex<Cell<bool>>,
}

impl ReleaseFlag {
    pub const fn new() -> Self {
        Self {
            raised: Mutex::new(Cell::new(false)),
        }
    }

    #[inline]
    pub(crate) fn raise(&self, ctx: &InterruptContext<'_>) {
        self.raised.borrow(ctx.cs).set(true);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        critical_section::with(|cs| self.raised.borrow(cs).get())
    }

    #[inline]
    pub fn clear(&self) {
        critical_section::with(|cs| self.raised.borrow(cs).set(false));
    }

    /// Read and clear in one step
    #[inline]
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.raised.borrow(cs).replace(false))
    }
}

impl Default for ReleaseFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-zero period in channel ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period(NonZeroU16);

impl Period {
    pub const fn new(ticks: u16) -> Option<Self> {
        match NonZeroU16::new(ticks) {
            Some(ticks) => Some(Period(ticks)),
            None => None,
        }
    }

    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    #[inline]
    pub const fn divides(self, ticks: u32) -> bool {
        ticks % self.0.get() as u32 == 0
    }
}

/// Period written by the main loop and read by a handler
pub struct PeriodParameter {
    period: Mutex<Cell<Period>>,
}

impl PeriodParameter {
    pub const fn new(period: Period) -> Self {
        Self {
            period: Mutex::new(Cell::new(period)),
        }
    }

    #[inline]
    pub fn get(&self) -> Period {
        critical_section::with(|cs| self.period.borrow(cs).get())
    }

    #[inline]
    pub(crate) fn get_in(&self, ctx: &InterruptContext<'_>) -> Period {
        self.period.borrow(ctx.cs).get()
    }

    #[inline]
    pub fn set(&self, period: Period) {
        critical_section::with(|cs| self.period.borrow(cs).set(period));
    }
}
