//! Level-tagged line logging over a serial sink
//!
//! Writes are best effort: a line that fails to go out is counted and
//! forgotten. Nothing here may be called from interrupt context.

use ufmt::uWrite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const fn tag(self) -> &'static str {
        match self {
            Level::Debug => "[DBG] ",
            Level::Info => "[INF] ",
            Level::Warn => "[WRN] ",
            Level::Error => "[ERR] ",
        }
    }
}

pub struct Logger<W> {
    sink: W,
    min_level: Level,
    dropped: u16,
}

impl<W: uWrite> Logger<W> {
    /// `[DBG]` lines are only kept with the `debug` feature
    pub fn new(sink: W) -> Self {
        let min_level = if cfg!(feature = "debug") {
            Level::Debug
        } else {
            Level::Info
        };
        Self::with_level(sink, min_level)
    }

    pub fn with_level(sink: W, min_level: Level) -> Self {
        Self {
            sink,
            min_level,
            dropped: 0,
        }
    }

    /// Emit one line, the body written by `body`
    pub fn log<F>(&mut self, level: Level, body: F)
    where
        F: FnOnce(&mut W) -> Result<(), W::Error>,
    {
        if level < self.min_level {
            return;
        }

        if write_line(&mut self.sink, level, body).is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }

    pub fn debug(&mut self, msg: &str) {
        self.log(Level::Debug, |w| w.write_str(msg));
    }

    pub fn info(&mut self, msg: &str) {
        self.log(Level::Info, |w| w.write_str(msg));
    }

    pub fn warn(&mut self, msg: &str) {
        self.log(Level::Warn, |w| w.write_str(msg));
    }

    pub fn error(&mut self, msg: &str) {
        self.log(Level::Error, |w| w.write_str(msg));
    }

    /// Lines lost to sink errors
    pub fn dropped(&self) -> u16 {
        self.dropped
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

fn write_line<W, F>(sink: &mut W, level: Level, body: F) -> Result<(), W::Error>
where
    W: uWrite,
    F: FnOnce(&mut W) -> Result<(), W::Error>,
{
    sink.write_str(level.tag())?;
    body(sink)?;
    sink.write_str("\r\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    pub(crate) struct Capture(pub String);

    impl uWrite for Capture {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            self.0.push_str(s);
            Ok(())
        }
    }

    /// Accepts `budget` writes, then fails every one
    pub(crate) struct Flaky {
        pub budget: usize,
        pub text: String,
    }

    impl uWrite for Flaky {
        type Error = ();

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            if self.budget == 0 {
                return Err(());
            }
            self.budget -= 1;
            self.text.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn lines_are_tagged_and_terminated() {
        let mut log = Logger::with_level(Capture::default(), Level::Info);
        log.info("timers up");
        log.error("bad period");
        assert_eq!(log.sink().0, "[INF] timers up\r\n[ERR] bad period\r\n");
    }

    #[test]
    fn below_level_is_filtered() {
        let mut log = Logger::with_level(Capture::default(), Level::Warn);
        log.debug("noise");
        log.info("noise");
        log.warn("kept");
        assert_eq!(log.into_inner().0, "[WRN] kept\r\n");
    }

    #[test]
    fn failed_writes_are_counted_not_raised() {
        let mut log = Logger::with_level(Flaky { budget: 1, text: String::new() }, Level::Debug);
        log.info("first");
        log.info("second");
        assert_eq!(log.dropped(), 2);
        assert_eq!(log.sink().text, "[INF] ");
    }
}
