#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `shell` defines how long-running, streaming commands are executed against
//! a named device: command text in, raw output chunks out, bounded by an
//! overall deadline and an inactivity deadline.
//!
//! # Design
//!
//! - [`ShellOutputReceiver`] consumes output and owns the cancellation flag.
//! - [`ShellEnabledDevice`] is the contract every executor implements.
//! - [`DeadlineTracker`] measures both deadlines on the monotonic clock and
//!   [`pump_output`] runs the wait loop that enforces them.
//! - [`ProcessDevice`] fulfils the contract with local subprocesses.
//!
//! # Errors
//!
//! Every failure is a [`ShellError`] and is returned to the caller unchanged;
//! nothing is retried. A receiver-initiated stop is not an error.
//!
//! # Examples
//!
//! ```no_run
//! use shell::{LineReceiver, ProcessDevice, ShellEnabledDevice};
//! use std::time::Duration;
//!
//! let device = ProcessDevice::shell("local");
//! let mut receiver = LineReceiver::new(|line: &str| println!("{line}"));
//! device.execute_shell_command_with_timeout(
//!     "uname -a",
//!     &mut receiver,
//!     Duration::from_secs(10),
//!     Duration::from_secs(2),
//! )?;
//! # Ok::<(), shell::ShellError>(())
//! ```

mod device;
mod error;
mod process;
mod pump;
mod receiver;
mod timeout;

pub use device::ShellEnabledDevice;
pub use error::ShellError;
pub use process::{LOG_TAG, ProcessDevice};
pub use pump::{DEFAULT_POLL_INTERVAL, PumpOutcome, StreamEvent, pump_output};
pub use receiver::{
    CancelHandle, CollectingOutputReceiver, LineReceiver, NullOutputReceiver, ShellOutputReceiver,
};
pub use timeout::{CommandTimeouts, DeadlineTracker, TimeUnit};
