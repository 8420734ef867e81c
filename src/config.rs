//! Configuration constants for the three-timer LED firmware

/// CPU frequency in Hz, exported by `build.rs`
pub const CPU_FREQ_HZ: u32 = parse_hz(env!("MCU_FREQ_HZ"));

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// UBRR0 value for [`UART_BAUD`] in normal-speed asynchronous mode
pub const UBRR: u16 = ((CPU_FREQ_HZ / (16 * UART_BAUD)) - 1) as u16;

/// Software clock (red channel) tick rate
pub const MS_TICK_HZ: u32 = 1000;

/// Tick resolution of the yellow channel in milliseconds
pub const Y_TIMER_RESOLUTION_MS: u16 = 100;

/// Yellow channel tick rate, derived from its resolution
pub const YELLOW_TICK_HZ: u32 = 1000 / Y_TIMER_RESOLUTION_MS as u32;

/// Red toggle period, in 1 ms ticks
pub const RED_PERIOD_MS: u16 = 500;

/// Yellow toggle period in milliseconds
pub const YELLOW_PERIOD_MS: u16 = 1000;

/// Full green blink period (on + off) in milliseconds
pub const GREEN_PERIOD_MS: u16 = 2000;

const fn parse_hz(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut value = 0u32;
    let mut i = 0;
    while i < bytes.len() {
        let digit = bytes[i];
        assert!(digit.is_ascii_digit(), "MCU_FREQ_HZ must be decimal");
        value = value * 10 + (digit - b'0') as u32;
        i += 1;
    }
    assert!(value > 0, "MCU_FREQ_HZ must be non-zero");
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_comes_from_build_script() {
        assert_eq!(CPU_FREQ_HZ, 20_000_000);
    }

    #[test]
    fn baud_divisor_matches_datasheet() {
        // 20 MHz / (16 * 9600) - 1 = 129.2
        assert_eq!(UBRR, 129);
    }

    #[test]
    fn yellow_resolution_is_ten_hertz() {
        assert_eq!(YELLOW_TICK_HZ, 10);
    }
}
