//! crates/logging/src/log.rs
//! Level-gated logging facade.

use std::error::Error;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use crate::config::LogConfig;
use crate::failure::render_failure;
use crate::format::hex_dump_lines;
use crate::level::LogLevel;
use crate::output::LogOutput;
use crate::registry::SinkRegistry;

/// Tag used by [`Log::hex_dump_all`].
pub const HEX_DUMP_TAG: &str = "ddms";

/// A logging context: gate level, sink registry and hex dump switch.
///
/// Every entry point except [`log_and_display`](Self::log_and_display)
/// checks the gate first and returns before doing any formatting when the
/// message is below it. Nothing here panics or reports errors; a sink that
/// fails to write simply loses the line.
///
/// Most code shares one context through [`global`]; tests build their own.
///
/// ```
/// use std::sync::Arc;
/// use logging::{Log, LogConfig, LogLevel, LogOutput, MemoryOutput};
///
/// let log = Log::new(LogConfig::new().with_level(LogLevel::Debug));
/// let memory = Arc::new(MemoryOutput::new());
/// let sink: Arc<dyn LogOutput> = memory.clone();
/// log.add_logger(sink);
///
/// log.info("TAG", "hello");
/// log.verbose("TAG", "too quiet to pass the gate");
///
/// let records = memory.records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].message, "hello");
/// ```
#[derive(Debug)]
pub struct Log {
    gate: AtomicU8,
    hex_dump: bool,
    registry: SinkRegistry,
}

impl Log {
    /// Creates a context that falls back to standard output.
    #[must_use]
    pub fn new(config: LogConfig) -> Self {
        Self::with_registry(config, SinkRegistry::new())
    }

    /// Creates a context whose fallback sink is `console` instead of standard output.
    #[must_use]
    pub fn with_console(config: LogConfig, console: Arc<dyn LogOutput>) -> Self {
        Self::with_registry(config, SinkRegistry::with_fallback(console))
    }

    fn with_registry(config: LogConfig, registry: SinkRegistry) -> Self {
        Self {
            gate: AtomicU8::new(config.level.priority()),
            hex_dump: config.hex_dump,
            registry,
        }
    }

    /// Changes the minimum level that is dispatched.
    pub fn set_level(&self, level: LogLevel) {
        self.gate.store(level.priority(), Ordering::Relaxed);
    }

    /// Returns the minimum level that is dispatched.
    #[must_use]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_priority(self.gate.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Reports whether a message at `level` passes the gate.
    #[must_use]
    pub fn is_at_least(&self, level: LogLevel) -> bool {
        level.priority() >= self.gate.load(Ordering::Relaxed)
    }

    /// Reports whether hex dumps are enabled for this context.
    #[must_use]
    pub const fn hex_dump_enabled(&self) -> bool {
        self.hex_dump
    }

    /// Returns the sink registry.
    #[must_use]
    pub const fn registry(&self) -> &SinkRegistry {
        &self.registry
    }

    /// Adds a sink to the multiplexed set.
    pub fn add_logger(&self, output: Arc<dyn LogOutput>) {
        self.registry.register(output);
    }

    /// Removes a sink from the multiplexed set.
    pub fn remove_logger(&self, output: &Arc<dyn LogOutput>) {
        self.registry.unregister(output);
    }

    /// Installs or clears the single legacy output.
    ///
    /// Prefer [`add_logger`](Self::add_logger). When both a legacy output and
    /// registered sinks exist, every message reaches both.
    pub fn set_log_output(&self, output: Option<Arc<dyn LogOutput>>) {
        self.registry.set_legacy_output(output);
    }

    /// Dispatches `message` if `level` passes the gate.
    pub fn println(&self, level: LogLevel, tag: &str, message: &str) {
        if !self.is_at_least(level) {
            return;
        }
        self.registry.dispatch_plain(level, tag, message);
    }

    /// Logs at [`LogLevel::Verbose`].
    pub fn verbose(&self, tag: &str, message: &str) {
        self.println(LogLevel::Verbose, tag, message);
    }

    /// Logs at [`LogLevel::Debug`].
    pub fn debug(&self, tag: &str, message: &str) {
        self.println(LogLevel::Debug, tag, message);
    }

    /// Logs at [`LogLevel::Info`].
    pub fn info(&self, tag: &str, message: &str) {
        self.println(LogLevel::Info, tag, message);
    }

    /// Logs at [`LogLevel::Warn`].
    pub fn warn(&self, tag: &str, message: &str) {
        self.println(LogLevel::Warn, tag, message);
    }

    /// Logs at [`LogLevel::Error`].
    pub fn error(&self, tag: &str, message: &str) {
        self.println(LogLevel::Error, tag, message);
    }

    /// Logs at [`LogLevel::Assert`].
    pub fn assert(&self, tag: &str, message: &str) {
        self.println(LogLevel::Assert, tag, message);
    }

    /// Logs an error value with its trace; `None` logs nothing.
    pub fn log_failure(&self, level: LogLevel, tag: &str, failure: Option<&(dyn Error + 'static)>) {
        let Some(failure) = failure else {
            return;
        };
        if !self.is_at_least(level) {
            return;
        }
        self.registry
            .dispatch_plain(level, tag, &render_failure(failure));
    }

    /// Logs an error value at [`LogLevel::Verbose`].
    pub fn verbose_failure(&self, tag: &str, failure: Option<&(dyn Error + 'static)>) {
        self.log_failure(LogLevel::Verbose, tag, failure);
    }

    /// Logs an error value at [`LogLevel::Debug`].
    pub fn debug_failure(&self, tag: &str, failure: Option<&(dyn Error + 'static)>) {
        self.log_failure(LogLevel::Debug, tag, failure);
    }

    /// Logs an error value at [`LogLevel::Info`].
    pub fn info_failure(&self, tag: &str, failure: Option<&(dyn Error + 'static)>) {
        self.log_failure(LogLevel::Info, tag, failure);
    }

    /// Logs an error value at [`LogLevel::Warn`].
    pub fn warn_failure(&self, tag: &str, failure: Option<&(dyn Error + 'static)>) {
        self.log_failure(LogLevel::Warn, tag, failure);
    }

    /// Logs an error value at [`LogLevel::Error`].
    pub fn error_failure(&self, tag: &str, failure: Option<&(dyn Error + 'static)>) {
        self.log_failure(LogLevel::Error, tag, failure);
    }

    /// Logs an error value at [`LogLevel::Assert`].
    pub fn assert_failure(&self, tag: &str, failure: Option<&(dyn Error + 'static)>) {
        self.log_failure(LogLevel::Assert, tag, failure);
    }

    /// Sends `message` through the prompt path of every sink.
    ///
    /// User-facing notices are not subject to the gate.
    pub fn log_and_display(&self, level: LogLevel, tag: &str, message: &str) {
        self.registry.dispatch_prompt(level, tag, message);
    }

    /// Logs `data[offset..offset + length]` as hex dump lines.
    ///
    /// Does nothing unless hex dumps were enabled in the [`LogConfig`]. Lines
    /// are dispatched one message each and gated like any other message.
    pub fn hex_dump(&self, tag: &str, level: LogLevel, data: &[u8], offset: usize, length: usize) {
        if !self.hex_dump || !self.is_at_least(level) {
            return;
        }
        for line in hex_dump_lines(data, offset, length) {
            self.registry.dispatch_plain(level, tag, &line);
        }
    }

    /// Dumps the whole buffer at [`LogLevel::Debug`] under [`HEX_DUMP_TAG`].
    pub fn hex_dump_all(&self, data: &[u8]) {
        self.hex_dump(HEX_DUMP_TAG, LogLevel::Debug, data, 0, data.len());
    }
}

impl Default for Log {
    fn default() -> Self {
        Self::new(LogConfig::new())
    }
}

static GLOBAL: OnceLock<Arc<Log>> = OnceLock::new();

/// Returns the process-wide context, creating it from
/// [`LogConfig::from_env`] on first use.
pub fn global() -> Arc<Log> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(Log::new(LogConfig::from_env()))))
}

/// Installs `log` as the process-wide context.
///
/// Fails with the rejected context when [`global`] was already initialised.
pub fn install_global(log: Arc<Log>) -> Result<(), Arc<Log>> {
    GLOBAL.set(log)
}
