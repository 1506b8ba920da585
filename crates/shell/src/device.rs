//! crates/shell/src/device.rs
//! Named command sources.

use std::time::Duration;

use crate::error::ShellError;
use crate::receiver::ShellOutputReceiver;
use crate::timeout::{CommandTimeouts, TimeUnit};

/// Something with a display name that can run shell-style command text.
///
/// Output is streamed to the receiver as it arrives. A call returns when the
/// command completes, when a deadline is violated, or when the receiver asks
/// to be cancelled. Cancellation is not an error: the call returns `Ok(())`
/// after flushing the receiver.
///
/// For both timeouts a zero duration means unbounded. With no inactivity
/// bound the call blocks until the command ends or the receiver cancels,
/// which is how endless streams such as log following are consumed.
///
/// Calls block the current thread; run them off any thread that must stay
/// responsive.
pub trait ShellEnabledDevice: Send + Sync {
    /// Returns the name used to identify this device to users.
    fn name(&self) -> &str;

    /// Runs `command` with only an inactivity bound.
    fn execute_shell_command(
        &self,
        command: &str,
        receiver: &mut dyn ShellOutputReceiver,
        max_time_to_output_response: Duration,
    ) -> Result<(), ShellError> {
        self.execute_shell_command_with_timeout(
            command,
            receiver,
            Duration::ZERO,
            max_time_to_output_response,
        )
    }

    /// Runs `command` with an overall bound and an inactivity bound.
    fn execute_shell_command_with_timeout(
        &self,
        command: &str,
        receiver: &mut dyn ShellOutputReceiver,
        max_timeout: Duration,
        max_time_to_output_response: Duration,
    ) -> Result<(), ShellError>;

    /// Runs `command` with only an inactivity bound expressed in `unit`.
    fn execute_shell_command_with_unit(
        &self,
        command: &str,
        receiver: &mut dyn ShellOutputReceiver,
        max_time_to_output_response: u64,
        unit: TimeUnit,
    ) -> Result<(), ShellError> {
        self.execute_shell_command_in(command, receiver, 0, max_time_to_output_response, unit)
    }

    /// Runs `command` with integer limits expressed in `unit`.
    fn execute_shell_command_in(
        &self,
        command: &str,
        receiver: &mut dyn ShellOutputReceiver,
        max_timeout: u64,
        max_time_to_output_response: u64,
        unit: TimeUnit,
    ) -> Result<(), ShellError> {
        let timeouts = CommandTimeouts::from_units(max_timeout, max_time_to_output_response, unit);
        self.execute_shell_command_with_timeout(
            command,
            receiver,
            timeouts.overall().unwrap_or_default(),
            timeouts.inactivity().unwrap_or_default(),
        )
    }
}
