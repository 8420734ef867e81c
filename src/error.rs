//! Configuration errors for timer channels

use core::fmt;

use ufmt::{uDisplay, uWrite, Formatter};

use crate::rtos::Channel;

/// Why a channel configuration could not be built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Requested frequency or period is zero
    ZeroRate,
    /// No prescaler yields a compare target that fits the register
    OutOfRange,
    /// An explicit compare target is 0 or above `max`, one past the register maximum
    CompareOutOfRange { compare: u32, max: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroRate => write!(f, "zero frequency or period"),
            Self::OutOfRange => write!(f, "rate not representable with any prescaler"),
            Self::CompareOutOfRange { compare, max } => {
                write!(f, "compare target {} outside 1..={}", compare, max)
            }
        }
    }
}

impl uDisplay for ConfigError {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            Self::ZeroRate => f.write_str("zero frequency or period"),
            Self::OutOfRange => f.write_str("rate not representable with any prescaler"),
            Self::CompareOutOfRange { compare, max } => {
                f.write_str("compare target ")?;
                uDisplay::fmt(compare, f)?;
                f.write_str(" outside 1..=")?;
                uDisplay::fmt(max, f)
            }
        }
    }
}

/// A configuration error tagged with the channel that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupError {
    pub channel: Channel,
    pub cause: ConfigError,
}

impl SetupError {
    pub const fn new(channel: Channel, cause: ConfigError) -> Self {
        Self { channel, cause }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} channel: {}", self.channel.name(), self.cause)
    }
}

impl uDisplay for SetupError {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.channel.name())?;
        f.write_str(" channel: ")?;
        uDisplay::fmt(&self.cause, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_channel_and_cause() {
        let err = SetupError::new(Channel::Green, ConfigError::OutOfRange);
        assert_eq!(
            format!("{}", err),
            "green channel: rate not representable with any prescaler"
        );
    }

    #[test]
    fn compare_error_reports_bounds() {
        let err = ConfigError::CompareOutOfRange { compare: 300, max: 256 };
        assert_eq!(format!("{}", err), "compare target 300 outside 1..=256");
    }
}
