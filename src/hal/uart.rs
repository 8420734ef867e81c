use avr_device::atmega1284p::USART0;
use core::convert::Infallible;

use crate::config::UBRR;

// UCSR0A
const UDRE0: u8 = 1 << 5;
// UCSR0B
const TXEN0: u8 = 1 << 3;
// UCSR0C: asynchronous, no parity, 1 stop bit, 8 data bits
const UCSZ_8BIT: u8 = 0b11 << 1;

/// Transmit-only USART0, polled
pub struct Uart {
    usart: USART0,
}

impl Uart {
    pub fn new(usart: USART0) -> Self {
        unsafe {
            usart.ubrr0.write(|w| w.bits(UBRR));
            usart.ucsr0c.write(|w| w.bits(UCSZ_8BIT));
            usart.ucsr0b.write(|w| w.bits(TXEN0));
        }

        Self { usart }
    }

    /// Queue one byte, or `WouldBlock` while the data register is full
    pub fn write_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if self.usart.ucsr0a.read().bits() & UDRE0 == 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.usart.udr0.write(|w| unsafe { w.bits(byte) });
        Ok(())
    }
}
