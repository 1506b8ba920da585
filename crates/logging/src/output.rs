//! crates/logging/src/output.rs
//! Sink contract and the sinks shipped with the crate.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use crate::format::format_line;
use crate::level::LogLevel;

/// Destination for log messages.
///
/// Implementations are shared across threads through `Arc` and receive the
/// raw `(level, tag, message)` triple so they can format it however they
/// like; [`format_line`] gives the standard rendering.
pub trait LogOutput: Send + Sync {
    /// Receives a message that should be printed.
    fn print_log(&self, level: LogLevel, tag: &str, message: &str);

    /// Receives a message that should be printed and, where the sink has a
    /// user-facing surface, shown to the user.
    fn print_and_prompt_log(&self, level: LogLevel, tag: &str, message: &str);
}

/// Sink that writes formatted lines to standard output.
///
/// This is the fallback used when nothing else is configured. It has no
/// dialog surface, so prompted messages are printed like any other line.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleOutput;

impl ConsoleOutput {
    fn write_line(level: LogLevel, tag: &str, message: &str) {
        let line = format_line(level, tag, message);
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(line.as_bytes());
        let _ = stdout.flush();
    }
}

impl LogOutput for ConsoleOutput {
    fn print_log(&self, level: LogLevel, tag: &str, message: &str) {
        Self::write_line(level, tag, message);
    }

    fn print_and_prompt_log(&self, level: LogLevel, tag: &str, message: &str) {
        Self::write_line(level, tag, message);
    }
}

/// Sink that writes formatted lines into any [`Write`] implementor.
///
/// Write errors are dropped: a failing log destination must never turn
/// into a failure of the code doing the logging.
///
/// ```
/// use logging::{LogLevel, LogOutput, WriterOutput};
///
/// let sink = WriterOutput::new(Vec::new());
/// sink.print_log(LogLevel::Warn, "disk", "almost full");
/// let text = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(text.ends_with(" W/disk: almost full\n"));
/// ```
#[derive(Debug, Default)]
pub struct WriterOutput<W> {
    writer: Mutex<W>,
}

impl<W> WriterOutput<W> {
    /// Wraps `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the sink and returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> WriterOutput<W> {
    fn write_line(&self, level: LogLevel, tag: &str, message: &str) {
        let line = format_line(level, tag, message);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }
}

impl<W: Write + Send> LogOutput for WriterOutput<W> {
    fn print_log(&self, level: LogLevel, tag: &str, message: &str) {
        self.write_line(level, tag, message);
    }

    fn print_and_prompt_log(&self, level: LogLevel, tag: &str, message: &str) {
        self.write_line(level, tag, message);
    }
}

/// A message captured by [`MemoryOutput`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity of the message.
    pub level: LogLevel,
    /// Tag supplied by the caller.
    pub tag: String,
    /// Message body.
    pub message: String,
    /// Whether the message arrived through the prompt path.
    pub prompted: bool,
}

/// Sink that keeps every message it receives in memory.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryOutput {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the captured records, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Removes and returns the captured records.
    pub fn drain(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns how many records have been captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Reports whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, level: LogLevel, tag: &str, message: &str, prompted: bool) {
        self.lock().push(LogRecord {
            level,
            tag: tag.to_owned(),
            message: message.to_owned(),
            prompted,
        });
    }
}

impl LogOutput for MemoryOutput {
    fn print_log(&self, level: LogLevel, tag: &str, message: &str) {
        self.push(level, tag, message, false);
    }

    fn print_and_prompt_log(&self, level: LogLevel, tag: &str, message: &str) {
        self.push(level, tag, message, true);
    }
}
