//! crates/shell/src/error.rs
//! Failures surfaced by command execution.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Error raised by [`ShellEnabledDevice`](crate::ShellEnabledDevice) calls.
///
/// Each timeout variant carries the elapsed time and the configured limit.
/// None of these are retried by the executor; retry policy belongs to the
/// caller.
///
/// # Exit Codes
///
/// [`exit_code`](Self::exit_code) maps each variant onto a process exit code
/// for front-ends: 30 for the overall timeout, 31 for an unresponsive
/// command, 127 for a rejected command and 1 for transport faults.
///
/// ```
/// use shell::ShellError;
/// use std::time::Duration;
///
/// let error = ShellError::ConnectionTimeout {
///     elapsed: Duration::from_secs(12),
///     limit: Duration::from_secs(10),
/// };
/// assert_eq!(error.exit_code(), 30);
/// assert!(error.is_timeout());
/// ```
#[derive(Debug, Error)]
pub enum ShellError {
    /// The overall deadline expired before the command completed.
    #[error("command did not complete within {limit:?} (elapsed: {elapsed:?})")]
    ConnectionTimeout {
        /// Time since the command started.
        elapsed: Duration,
        /// Configured overall timeout.
        limit: Duration,
    },

    /// The command produced no output for longer than the inactivity timeout.
    #[error("command produced no output for {elapsed:?} (limit: {limit:?})")]
    UnresponsiveCommand {
        /// Time since the last output chunk, or since start if none arrived.
        elapsed: Duration,
        /// Configured inactivity timeout.
        limit: Duration,
    },

    /// The execution channel refused the command.
    #[error("command rejected: {reason} (command: {command:?})")]
    CommandRejected {
        /// Command text as supplied by the caller.
        command: String,
        /// Why the channel refused it.
        reason: String,
    },

    /// Any other transport fault.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Creates a [`ShellError::CommandRejected`].
    pub fn rejected(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandRejected {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Reports whether this is one of the two deadline violations.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::UnresponsiveCommand { .. }
        )
    }

    /// Returns the process exit code a front-end should use for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionTimeout { .. } => 30,
            Self::UnresponsiveCommand { .. } => 31,
            Self::CommandRejected { .. } => 127,
            Self::Io(_) => 1,
        }
    }
}
