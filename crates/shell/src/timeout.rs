//! crates/shell/src/timeout.rs
//!
//! Overall and inactivity deadlines for a running command.
//!
//! Both limits use the same convention: zero means unbounded, never a
//! zero-length deadline. The inactivity deadline is re-armed by every output
//! chunk; the overall deadline runs from the moment the tracker is created.
//! Elapsed time is measured on the monotonic clock.
//!
//! # Examples
//!
//! ```
//! use shell::{CommandTimeouts, DeadlineTracker, TimeUnit};
//! use std::time::Duration;
//!
//! let timeouts = CommandTimeouts::from_units(0, 5, TimeUnit::Seconds);
//! assert_eq!(timeouts.overall(), None);
//! assert_eq!(timeouts.inactivity(), Some(Duration::from_secs(5)));
//!
//! let mut tracker = DeadlineTracker::new(timeouts);
//! tracker.record_output();
//! assert!(tracker.check().is_ok());
//! ```

use std::time::{Duration, Instant};

use crate::error::ShellError;

/// Unit for timeout values given as plain integers.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TimeUnit {
    /// Milliseconds.
    #[default]
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
}

impl TimeUnit {
    /// Converts `value` in this unit into a [`Duration`], saturating on overflow.
    #[must_use]
    pub const fn to_duration(self, value: u64) -> Duration {
        match self {
            Self::Milliseconds => Duration::from_millis(value),
            Self::Seconds => Duration::from_secs(value),
            Self::Minutes => Duration::from_secs(value.saturating_mul(60)),
        }
    }
}

/// The two limits applied to one command.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CommandTimeouts {
    overall: Option<Duration>,
    inactivity: Option<Duration>,
}

impl CommandTimeouts {
    /// No limits at all: the command runs until it completes or is cancelled.
    pub const UNBOUNDED: Self = Self {
        overall: None,
        inactivity: None,
    };

    /// Builds limits from raw durations, where zero means unbounded.
    #[must_use]
    pub const fn new(overall: Duration, inactivity: Duration) -> Self {
        Self {
            overall: non_zero(overall),
            inactivity: non_zero(inactivity),
        }
    }

    /// Builds limits from integer values in `unit`, where zero means unbounded.
    #[must_use]
    pub const fn from_units(overall: u64, inactivity: u64, unit: TimeUnit) -> Self {
        Self::new(unit.to_duration(overall), unit.to_duration(inactivity))
    }

    /// Builds limits with only an inactivity bound.
    #[must_use]
    pub const fn inactivity_only(inactivity: Duration) -> Self {
        Self::new(Duration::ZERO, inactivity)
    }

    /// Returns the overall limit, if bounded.
    #[must_use]
    pub const fn overall(&self) -> Option<Duration> {
        self.overall
    }

    /// Returns the inactivity limit, if bounded.
    #[must_use]
    pub const fn inactivity(&self) -> Option<Duration> {
        self.inactivity
    }

    /// Reports whether neither limit is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.overall.is_none() && self.inactivity.is_none()
    }
}

const fn non_zero(duration: Duration) -> Option<Duration> {
    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

/// Tracks elapsed time against a [`CommandTimeouts`].
#[derive(Debug)]
pub struct DeadlineTracker {
    timeouts: CommandTimeouts,
    started: Instant,
    last_output: Instant,
}

impl DeadlineTracker {
    /// Starts both clocks now.
    #[must_use]
    pub fn new(timeouts: CommandTimeouts) -> Self {
        let now = Instant::now();
        Self {
            timeouts,
            started: now,
            last_output: now,
        }
    }

    /// Returns the limits being tracked.
    #[must_use]
    pub const fn timeouts(&self) -> CommandTimeouts {
        self.timeouts
    }

    /// Re-arms the inactivity deadline.
    pub fn record_output(&mut self) {
        self.last_output = Instant::now();
    }

    /// Returns the time since the tracker was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns the time since the last recorded output.
    #[must_use]
    pub fn idle(&self) -> Duration {
        self.last_output.elapsed()
    }

    /// Fails if either deadline has passed.
    ///
    /// The overall deadline is checked first, so a command that is both too
    /// slow and too quiet reports [`ShellError::ConnectionTimeout`].
    pub fn check(&self) -> Result<(), ShellError> {
        if let Some(limit) = self.timeouts.overall {
            let elapsed = self.elapsed();
            if elapsed >= limit {
                return Err(ShellError::ConnectionTimeout { elapsed, limit });
            }
        }

        if let Some(limit) = self.timeouts.inactivity {
            let elapsed = self.idle();
            if elapsed >= limit {
                return Err(ShellError::UnresponsiveCommand { elapsed, limit });
            }
        }

        Ok(())
    }

    /// Returns how long to wait for the next chunk: the smaller of `poll` and
    /// the time left before the nearest deadline.
    #[must_use]
    pub fn next_wait(&self, poll: Duration) -> Duration {
        let mut wait = poll;
        if let Some(limit) = self.timeouts.overall {
            wait = wait.min(limit.saturating_sub(self.elapsed()));
        }
        if let Some(limit) = self.timeouts.inactivity {
            wait = wait.min(limit.saturating_sub(self.idle()));
        }
        wait
    }
}
