use embedded_hal::digital::v2::OutputPin;

/// An LED on a plain output pin, toggled by firmware
///
/// The pin level is tracked here so any [`OutputPin`] will do, including ones
/// without a readback.
pub struct SoftLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> SoftLed<P> {
    /// Drives the pin low so the tracked state matches the hardware
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin, lit: false })
    }

    pub fn set(&mut self, lit: bool) -> Result<(), P::Error> {
        if lit {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.lit = lit;
        Ok(())
    }

    #[inline]
    pub fn toggle(&mut self) -> Result<(), P::Error> {
        self.set(!self.lit)
    }

    #[inline]
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn release(self) -> P {
        self.pin
    }
}
