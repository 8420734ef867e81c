//! Compare-match timer configuration
//!
//! A [`ChannelConfig`] is built and validated first, lowered into a
//! [`RegisterImage`] of plain register bytes, and only then written to a
//! peripheral through [`TimerRegisters`]. The write order in [`program`] keeps
//! the counter stopped until its final mode and top value are in place and
//! unmasks the compare interrupt last.

use crate::error::ConfigError;
use crate::hal::clock::{self, Prescaler, Rate, TimerWidth};

// TCCRnA
const COM_A_MASK: u8 = 0b11 << 6;
const COM_A_TOGGLE: u8 = 0b01 << 6;
const COM_A_CLEAR: u8 = 0b10 << 6;
const WGM_CTC_8BIT: u8 = 1 << 1; // WGM01
// TCCRnB
const WGM_CTC_16BIT: u8 = 1 << 3; // WGMn2
// TCCR0B / TCCRnC
const FOC_A: u8 = 1 << 7;
// TIMSKn / TIFRn
const OCIE_A: u8 = 1 << 1;

/// What the peripheral does on a compare match besides resetting the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingMode {
    /// Counter clears; the interrupt handler does all visible work
    ResetOnCompare,
    /// Counter clears and the hardware flips `OCnA`
    ToggleOnCompare,
}

/// A validated prescaler/compare pair for one timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    width: TimerWidth,
    mode: CountingMode,
    prescaler: Prescaler,
    compare: u32,
}

impl ChannelConfig {
    pub fn builder(width: TimerWidth) -> ChannelBuilder {
        ChannelBuilder::new(width)
    }

    #[inline]
    pub fn mode(&self) -> CountingMode {
        self.mode
    }

    #[inline]
    pub fn prescaler(&self) -> Prescaler {
        self.prescaler
    }

    /// Counter divisor, `>= 1`. The register holds this value minus one.
    #[inline]
    pub fn compare(&self) -> u32 {
        self.compare
    }

    /// CPU cycles between two compare matches
    #[inline]
    pub fn cycles_per_match(&self) -> u32 {
        self.prescaler.divisor() * self.compare
    }

    pub fn actual_millihertz(&self, clock_hz: u32) -> u64 {
        clock::actual_millihertz(clock_hz, self.prescaler, self.compare)
    }

    pub fn period_us(&self, clock_hz: u32) -> u64 {
        clock::period_us(clock_hz, self.prescaler, self.compare)
    }

    /// Lower to raw register values
    pub fn register_image(&self) -> RegisterImage {
        let com = match self.mode {
            CountingMode::ResetOnCompare => 0,
            CountingMode::ToggleOnCompare => COM_A_TOGGLE,
        };
        let (wgm_a, wgm_b) = match self.width {
            TimerWidth::Bits8 => (WGM_CTC_8BIT, 0),
            TimerWidth::Bits16 => (0, WGM_CTC_16BIT),
        };

        RegisterImage {
            control_a: com | wgm_a,
            control_b: wgm_b | self.prescaler.bits(),
            // 1..=65536 by construction
            compare: (self.compare - 1) as u16,
            interrupt_mask: OCIE_A,
        }
    }
}

/// Builds a [`ChannelConfig`] from either a target rate or an explicit pair
#[derive(Debug, Clone, Copy)]
pub struct ChannelBuilder {
    width: TimerWidth,
    mode: CountingMode,
    rate: Option<Rate>,
    pair: Option<(Prescaler, u32)>,
}

impl ChannelBuilder {
    pub fn new(width: TimerWidth) -> Self {
        Self {
            width,
            mode: CountingMode::ResetOnCompare,
            rate: None,
            pair: None,
        }
    }

    pub fn mode(mut self, mode: CountingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Let the selector pick the prescaler and compare target
    pub fn rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Use this exact pair. Takes precedence over [`rate`](Self::rate).
    pub fn pair(mut self, prescaler: Prescaler, compare: u32) -> Self {
        self.pair = Some((prescaler, compare));
        self
    }

    pub fn build(self, clock_hz: u32) -> Result<ChannelConfig, ConfigError> {
        let max = self.width.max_compare();
        let (prescaler, compare) = match (self.pair, self.rate) {
            (Some((prescaler, compare)), _) => {
                if compare == 0 || compare > max {
                    return Err(ConfigError::CompareOutOfRange { compare, max });
                }
                (prescaler, compare)
            }
            (None, Some(rate)) => clock::select(clock_hz, rate, self.width)?,
            (None, None) => return Err(ConfigError::ZeroRate),
        };

        Ok(ChannelConfig {
            width: self.width,
            mode: self.mode,
            prescaler,
            compare,
        })
    }
}

/// Register contents for one timer in CTC mode with `OCRnA` as top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterImage {
    pub control_a: u8,
    pub control_b: u8,
    pub compare: u16,
    pub interrupt_mask: u8,
}

/// Raw register access for one timer/counter
pub trait TimerRegisters {
    fn write_interrupt_mask(&mut self, bits: u8);
    fn write_control_a(&mut self, bits: u8);
    fn write_control_b(&mut self, bits: u8);
    fn write_counter(&mut self, value: u16);
    fn write_compare(&mut self, value: u16);
    /// Strobe `FOCnA`, applying the current `COMnA` action to `OCnA` now
    fn force_compare(&mut self);
    /// Clear a pending `OCFnA`
    fn clear_compare_flag(&mut self);
}

/// Write `image` to a timer in an order that never runs it half-configured
///
/// A timer that drives `OCnA` starts with the pin low, so a toggle count of
/// zero always means "off".
pub fn program<R: TimerRegisters>(regs: &mut R, image: &RegisterImage) {
    critical_section::with(|_| {
        regs.write_interrupt_mask(0);
        // CSn2:0 = 0 stops the clock
        regs.write_control_b(0);
        regs.write_counter(0);
        if image.control_a & COM_A_MASK != 0 {
            regs.write_control_a(COM_A_CLEAR | (image.control_a & !COM_A_MASK));
            regs.force_compare();
        }
        regs.write_compare(image.compare);
        regs.write_control_a(image.control_a);
        regs.write_control_b(image.control_b);
        regs.clear_compare_flag();
        regs.write_interrupt_mask(image.interrupt_mask);
    });
}

#[cfg(target_arch = "avr")]
mod avr {
    use super::{TimerRegisters, FOC_A, OCIE_A};
    use avr_device::atmega1284p::{TC0, TC1, TC3};

    impl TimerRegisters for TC0 {
        fn write_interrupt_mask(&mut self, bits: u8) {
            self.timsk0.write(|w| unsafe { w.bits(bits) });
        }

        fn write_control_a(&mut self, bits: u8) {
            self.tccr0a.write(|w| unsafe { w.bits(bits) });
        }

        fn write_control_b(&mut self, bits: u8) {
            self.tccr0b.write(|w| unsafe { w.bits(bits) });
        }

        fn write_counter(&mut self, value: u16) {
            self.tcnt0.write(|w| unsafe { w.bits(value as u8) });
        }

        fn write_compare(&mut self, value: u16) {
            self.ocr0a.write(|w| unsafe { w.bits(value as u8) });
        }

        fn force_compare(&mut self) {
            // FOC0A lives in TCCR0B; CS bits stay zero
            self.tccr0b.write(|w| unsafe { w.bits(FOC_A) });
        }

        fn clear_compare_flag(&mut self) {
            // Flags clear by writing a one
            self.tifr0.write(|w| unsafe { w.bits(OCIE_A) });
        }
    }

    macro_rules! impl_timer16 {
        ($TC:ident, $timsk:ident, $tccra:ident, $tccrb:ident, $tccrc:ident, $tcnt:ident, $ocra:ident, $tifr:ident) => {
            impl TimerRegisters for $TC {
                fn write_interrupt_mask(&mut self, bits: u8) {
                    self.$timsk.write(|w| unsafe { w.bits(bits) });
                }

                fn write_control_a(&mut self, bits: u8) {
                    self.$tccra.write(|w| unsafe { w.bits(bits) });
                }

                fn write_control_b(&mut self, bits: u8) {
                    self.$tccrb.write(|w| unsafe { w.bits(bits) });
                }

                fn write_counter(&mut self, value: u16) {
                    self.$tcnt.write(|w| unsafe { w.bits(value) });
                }

                fn write_compare(&mut self, value: u16) {
                    self.$ocra.write(|w| unsafe { w.bits(value) });
                }

                fn force_compare(&mut self) {
                    self.$tccrc.write(|w| unsafe { w.bits(FOC_A) });
                }

                fn clear_compare_flag(&mut self) {
                    self.$tifr.write(|w| unsafe { w.bits(OCIE_A) });
                }
            }
        };
    }

    impl_timer16!(TC1, timsk1, tccr1a, tccr1b, tccr1c, tcnt1, ocr1a, tifr1);
    impl_timer16!(TC3, timsk3, tccr3a, tccr3b, tccr3c, tcnt3, ocr3a, tifr3);
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOCK: u32 = 20_000_000;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Write {
        Mask(u8),
        A(u8),
        B(u8),
        Counter(u16),
        Compare(u16),
        Force,
        ClearFlag,
    }

    #[derive(Default)]
    struct Recorder {
        writes: Vec<Write>,
    }

    impl TimerRegisters for Recorder {
        fn write_interrupt_mask(&mut self, bits: u8) {
            self.writes.push(Write::Mask(bits));
        }
        fn write_control_a(&mut self, bits: u8) {
            self.writes.push(Write::A(bits));
        }
        fn write_control_b(&mut self, bits: u8) {
            self.writes.push(Write::B(bits));
        }
        fn write_counter(&mut self, value: u16) {
            self.writes.push(Write::Counter(value));
        }
        fn write_compare(&mut self, value: u16) {
            self.writes.push(Write::Compare(value));
        }
        fn force_compare(&mut self) {
            self.writes.push(Write::Force);
        }
        fn clear_compare_flag(&mut self) {
            self.writes.push(Write::ClearFlag);
        }
    }

    #[test]
    fn software_clock_image_matches_lab_ocr() {
        let config = ChannelConfig::builder(TimerWidth::Bits8)
            .rate(Rate::hertz(1000))
            .build(CLOCK)
            .unwrap();
        let image = config.register_image();
        assert_eq!(image.compare, 77);
        assert_eq!(image.control_a, 0x02);
        assert_eq!(image.control_b, 0x04);
        assert_eq!(image.interrupt_mask, 0x02);
    }

    #[test]
    fn hardware_toggle_sets_com_bits() {
        let config = ChannelConfig::builder(TimerWidth::Bits16)
            .mode(CountingMode::ToggleOnCompare)
            .rate(Rate::period_ms(500).unwrap())
            .build(CLOCK)
            .unwrap();
        let image = config.register_image();
        assert_eq!(image.control_a, 0x40);
        assert_eq!(image.control_b, 0x08 | 0x04);
        assert_eq!(image.compare, 39_062);
    }

    #[test]
    fn explicit_pair_out_of_range_is_rejected() {
        let zero = ChannelConfig::builder(TimerWidth::Bits16)
            .pair(Prescaler::Div1024, 0)
            .build(CLOCK);
        assert_eq!(zero, Err(ConfigError::CompareOutOfRange { compare: 0, max: 65_536 }));

        let wide = ChannelConfig::builder(TimerWidth::Bits8)
            .pair(Prescaler::Div256, 257)
            .build(CLOCK);
        assert_eq!(wide, Err(ConfigError::CompareOutOfRange { compare: 257, max: 256 }));

        let wide = ChannelConfig::builder(TimerWidth::Bits16)
            .pair(Prescaler::Div1024, 65_537)
            .build(CLOCK);
        assert_eq!(wide, Err(ConfigError::CompareOutOfRange { compare: 65_537, max: 65_536 }));
    }

    #[test]
    fn full_register_divisor_is_accepted() {
        let tc0 = ChannelConfig::builder(TimerWidth::Bits8)
            .pair(Prescaler::Div1024, 256)
            .build(CLOCK)
            .unwrap();
        assert_eq!(tc0.register_image().compare, 255);
        assert_eq!(tc0.cycles_per_match(), 262_144);

        let tc1 = ChannelConfig::builder(TimerWidth::Bits16)
            .pair(Prescaler::Div1024, 65_536)
            .build(CLOCK)
            .unwrap();
        assert_eq!(tc1.register_image().compare, 65_535);
        assert_eq!(tc1.cycles_per_match(), 67_108_864);
    }

    #[test]
    fn explicit_pair_keeps_values() {
        let config = ChannelConfig::builder(TimerWidth::Bits16)
            .pair(Prescaler::Div1024, 1952)
            .build(CLOCK)
            .unwrap();
        assert_eq!(config.prescaler(), Prescaler::Div1024);
        assert_eq!(config.compare(), 1952);
        assert_eq!(config.cycles_per_match(), 1_998_848);
        assert_eq!(config.actual_millihertz(CLOCK) / 1000, 10);
    }

    #[test]
    fn builder_without_rate_fails() {
        assert_eq!(
            ChannelBuilder::new(TimerWidth::Bits8).build(CLOCK),
            Err(ConfigError::ZeroRate)
        );
    }

    #[test]
    fn programming_order_unmasks_last() {
        let config = ChannelConfig::builder(TimerWidth::Bits16)
            .rate(Rate::hertz(10))
            .build(CLOCK)
            .unwrap();
        let mut regs = Recorder::default();
        program(&mut regs, &config.register_image());

        assert_eq!(
            regs.writes,
            vec![
                Write::Mask(0),
                Write::B(0),
                Write::Counter(0),
                Write::Compare(31_249),
                Write::A(0x00),
                Write::B(0x08 | 0x03),
                Write::ClearFlag,
                Write::Mask(0x02),
            ]
        );
    }

    #[test]
    fn toggle_output_is_forced_low_before_start() {
        let config = ChannelConfig::builder(TimerWidth::Bits16)
            .mode(CountingMode::ToggleOnCompare)
            .rate(Rate::hertz(1))
            .build(CLOCK)
            .unwrap();
        let image = config.register_image();
        let mut regs = Recorder::default();
        program(&mut regs, &image);

        assert_eq!(
            regs.writes,
            vec![
                Write::Mask(0),
                Write::B(0),
                Write::Counter(0),
                Write::A(0x80),
                Write::Force,
                Write::Compare(image.compare),
                Write::A(0x40),
                Write::B(image.control_b),
                Write::ClearFlag,
                Write::Mask(0x02),
            ]
        );
    }
}
