//! crates/logging/src/macros.rs
//! Formatting macros that skip `format!` for messages below the gate.
//!
//! Each macro takes a [`Log`](crate::Log) (or anything that derefs to one), a
//! tag and a format string with arguments. The arguments are evaluated only
//! when the level passes the gate.

/// Logs a formatted message at an explicit level.
///
/// # Example
/// ```
/// use logging::{log_at, Log, LogConfig, LogLevel, MemoryOutput};
/// use std::sync::Arc;
///
/// let log = Log::new(LogConfig::new().with_level(LogLevel::Info));
/// let memory = Arc::new(MemoryOutput::new());
/// log.add_logger(memory.clone());
///
/// log_at!(log, LogLevel::Warn, "adb", "{} devices", 2);
/// assert_eq!(memory.records()[0].message, "2 devices");
/// ```
#[macro_export]
macro_rules! log_at {
    ($log:expr, $level:expr, $tag:expr, $($arg:tt)*) => {{
        let log: &$crate::Log = &$log;
        let level: $crate::LogLevel = $level;
        if log.is_at_least(level) {
            log.println(level, $tag, &::std::format!($($arg)*));
        }
    }};
}

/// Logs a formatted message at [`LogLevel::Verbose`](crate::LogLevel::Verbose).
#[macro_export]
macro_rules! log_verbose {
    ($log:expr, $tag:expr, $($arg:tt)*) => {
        $crate::log_at!($log, $crate::LogLevel::Verbose, $tag, $($arg)*)
    };
}

/// Logs a formatted message at [`LogLevel::Debug`](crate::LogLevel::Debug).
#[macro_export]
macro_rules! log_debug {
    ($log:expr, $tag:expr, $($arg:tt)*) => {
        $crate::log_at!($log, $crate::LogLevel::Debug, $tag, $($arg)*)
    };
}

/// Logs a formatted message at [`LogLevel::Info`](crate::LogLevel::Info).
#[macro_export]
macro_rules! log_info {
    ($log:expr, $tag:expr, $($arg:tt)*) => {
        $crate::log_at!($log, $crate::LogLevel::Info, $tag, $($arg)*)
    };
}

/// Logs a formatted message at [`LogLevel::Warn`](crate::LogLevel::Warn).
#[macro_export]
macro_rules! log_warn {
    ($log:expr, $tag:expr, $($arg:tt)*) => {
        $crate::log_at!($log, $crate::LogLevel::Warn, $tag, $($arg)*)
    };
}

/// Logs a formatted message at [`LogLevel::Error`](crate::LogLevel::Error).
#[macro_export]
macro_rules! log_error {
    ($log:expr, $tag:expr, $($arg:tt)*) => {
        $crate::log_at!($log, $crate::LogLevel::Error, $tag, $($arg)*)
    };
}

/// Logs a formatted message at [`LogLevel::Assert`](crate::LogLevel::Assert).
#[macro_export]
macro_rules! log_assert {
    ($log:expr, $tag:expr, $($arg:tt)*) => {
        $crate::log_at!($log, $crate::LogLevel::Assert, $tag, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Log, LogConfig, LogLevel, MemoryOutput};
    use std::cell::Cell;
    use std::sync::Arc;

    fn context(level: LogLevel) -> (Log, Arc<MemoryOutput>) {
        let log = Log::new(LogConfig::new().with_level(level));
        let memory = Arc::new(MemoryOutput::new());
        log.add_logger(memory.clone());
        (log, memory)
    }

    #[test]
    fn arguments_not_evaluated_below_gate() {
        let (log, memory) = context(LogLevel::Error);
        let evaluated = Cell::new(false);
        let probe = || {
            evaluated.set(true);
            "x"
        };
        log_debug!(log, "t", "{}", probe());
        assert!(!evaluated.get());
        assert!(memory.is_empty());
    }

    #[test]
    fn every_level_macro_dispatches() {
        let (log, memory) = context(LogLevel::Verbose);
        log_verbose!(log, "t", "v{}", 1);
        log_debug!(log, "t", "d{}", 2);
        log_info!(log, "t", "i{}", 3);
        log_warn!(log, "t", "w{}", 4);
        log_error!(log, "t", "e{}", 5);
        log_assert!(log, "t", "a{}", 6);

        let records = memory.records();
        let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["v1", "d2", "i3", "w4", "e5", "a6"]);
        assert_eq!(records[5].level, LogLevel::Assert);
    }

    #[test]
    fn accepts_shared_context() {
        let log = Arc::new(Log::new(LogConfig::new().with_level(LogLevel::Info)));
        let memory = Arc::new(MemoryOutput::new());
        log.add_logger(memory.clone());
        log_info!(*log, "t", "through arc");
        assert_eq!(memory.len(), 1);
    }
}
