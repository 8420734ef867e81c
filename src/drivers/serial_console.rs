use crate::hal::Uart;
use avr_device::atmega1284p::USART0;
use core::convert::Infallible;
use ufmt::uWrite;

/// Blocking text output on USART0
pub struct SerialConsole {
    uart: Uart,
}

impl SerialConsole {
    pub fn new(usart: USART0) -> Self {
        Self {
            uart: Uart::new(usart),
        }
    }

    pub fn write_byte(&mut self, byte: u8) {
        // Infallible: only ever WouldBlock
        let _ = nb::block!(self.uart.write_byte(byte));
    }
}

impl uWrite for SerialConsole {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
        Ok(())
    }
}
