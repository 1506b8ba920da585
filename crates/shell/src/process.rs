//! crates/shell/src/process.rs
//!
//! A [`ShellEnabledDevice`] backed by local subprocesses.
//!
//! Each command spawns one child with stdin closed and both stdout and
//! stderr piped. Two reader threads copy the pipes into a single channel, so
//! the receiver sees the merged output in arrival order, and the calling
//! thread runs [`pump_output`] over that channel. On Unix the child leads its
//! own process group. It is owned by a guard that kills the whole group and
//! reaps the child unless it already exited, which covers cancellation,
//! deadline violations and early returns alike. Killing the group also ends
//! grandchildren such as the commands a `sh -c` script starts, so the pipes
//! close and the reader threads exit.

use std::ffi::OsString;
use std::io::{self, Read};
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, unbounded};
use logging::{Log, log_debug, log_warn};

use crate::device::ShellEnabledDevice;
use crate::error::ShellError;
use crate::pump::{DEFAULT_POLL_INTERVAL, PumpOutcome, StreamEvent, pump_output};
use crate::receiver::ShellOutputReceiver;
use crate::timeout::{CommandTimeouts, DeadlineTracker};

/// Tag used for this module's log messages.
pub const LOG_TAG: &str = "ProcessDevice";

const READ_BUFFER_SIZE: usize = 8 * 1024;

#[derive(Clone, Debug)]
enum Launcher {
    /// `sh -c <command>`.
    Shell,
    /// `<argv...> <command words...>`.
    Prefix(Vec<OsString>),
}

/// Runs commands as local subprocesses.
///
/// ```no_run
/// use shell::{CollectingOutputReceiver, ProcessDevice, ShellEnabledDevice};
/// use std::time::Duration;
///
/// let device = ProcessDevice::with_prefix("emulator-5554", ["adb", "-s", "emulator-5554", "shell"]);
/// let mut receiver = CollectingOutputReceiver::new();
/// device.execute_shell_command("getprop ro.product.model", &mut receiver, Duration::from_secs(5))?;
/// println!("{}", receiver.output());
/// # Ok::<(), shell::ShellError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ProcessDevice {
    name: String,
    launcher: Launcher,
    poll_interval: Duration,
    log: Arc<Log>,
}

impl ProcessDevice {
    /// Creates a device that runs each command through `sh -c`.
    pub fn shell(name: impl Into<String>) -> Self {
        Self::new(name.into(), Launcher::Shell)
    }

    /// Creates a device that runs `argv` followed by the whitespace-separated
    /// words of each command.
    ///
    /// With an empty `argv` the first command word is the program.
    pub fn with_prefix<I, S>(name: impl Into<String>, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self::new(
            name.into(),
            Launcher::Prefix(argv.into_iter().map(Into::into).collect()),
        )
    }

    fn new(name: String, launcher: Launcher) -> Self {
        Self {
            name,
            launcher,
            poll_interval: DEFAULT_POLL_INTERVAL,
            log: logging::global(),
        }
    }

    /// Sets how often a silent command is re-checked for deadlines and cancellation.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Routes this device's diagnostics into `log` instead of the global context.
    #[must_use]
    pub fn with_log(mut self, log: Arc<Log>) -> Self {
        self.log = log;
        self
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn build_command(&self, command: &str) -> Result<Command, ShellError> {
        match &self.launcher {
            Launcher::Shell => {
                let mut process = Command::new("sh");
                process.arg("-c").arg(command);
                Ok(process)
            }
            Launcher::Prefix(argv) => {
                let mut words = argv
                    .iter()
                    .cloned()
                    .chain(command.split_whitespace().map(OsString::from));
                let program = words
                    .next()
                    .ok_or_else(|| ShellError::rejected(command, "no program to run"))?;
                let mut process = Command::new(program);
                process.args(words);
                Ok(process)
            }
        }
    }

    fn spawn(&self, command: &str) -> Result<ChildGuard, ShellError> {
        let mut process = self.build_command(command)?;
        process
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            process.process_group(0);
        }

        let child = process.spawn().map_err(|error| match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                ShellError::rejected(command, error.to_string())
            }
            _ => ShellError::Io(error),
        })?;
        Ok(ChildGuard {
            child,
            reaped: false,
        })
    }

    /// Waits for a child whose output streams have closed, still honouring
    /// the deadlines and the receiver's cancellation flag.
    fn wait_for_exit(
        &self,
        guard: &mut ChildGuard,
        receiver: &dyn ShellOutputReceiver,
        tracker: &DeadlineTracker,
    ) -> Result<Option<ExitStatus>, ShellError> {
        loop {
            if let Some(status) = guard.try_wait()? {
                return Ok(Some(status));
            }
            if receiver.is_cancelled() {
                return Ok(None);
            }
            tracker.check()?;
            thread::sleep(tracker.next_wait(self.poll_interval));
        }
    }
}

impl ShellEnabledDevice for ProcessDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute_shell_command_with_timeout(
        &self,
        command: &str,
        receiver: &mut dyn ShellOutputReceiver,
        max_timeout: Duration,
        max_time_to_output_response: Duration,
    ) -> Result<(), ShellError> {
        if command.trim().is_empty() {
            return Err(ShellError::rejected(command, "empty command"));
        }

        let mut tracker =
            DeadlineTracker::new(CommandTimeouts::new(max_timeout, max_time_to_output_response));
        let mut guard = self.spawn(command)?;
        log_debug!(
            self.log,
            LOG_TAG,
            "{}: started '{}' (pid {})",
            self.name,
            command,
            guard.child.id()
        );

        let (tx, rx) = unbounded();
        let stdout = guard.child.stdout.take();
        let stderr = guard.child.stderr.take();
        let producers = spawn_reader(&self.name, "stdout", stdout, tx.clone())?
            + spawn_reader(&self.name, "stderr", stderr, tx)?;

        let outcome = pump_output(&rx, producers, receiver, &mut tracker, self.poll_interval)
            .inspect_err(|error| {
                log_warn!(self.log, LOG_TAG, "{}: '{}' aborted: {}", self.name, command, error);
            })?;

        if outcome == PumpOutcome::Cancelled {
            log_debug!(self.log, LOG_TAG, "{}: '{}' cancelled by receiver", self.name, command);
            return Ok(());
        }

        match self.wait_for_exit(&mut guard, receiver, &tracker)? {
            Some(status) if !status.success() => {
                log_warn!(self.log, LOG_TAG, "{}: '{}' {}", self.name, command, status);
            }
            Some(_) => {}
            None => {
                log_debug!(self.log, LOG_TAG, "{}: '{}' cancelled by receiver", self.name, command);
            }
        }
        Ok(())
    }
}

/// Kills the child's process group and reaps the child unless it already
/// exited and was reaped.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        self.reaped = status.is_some();
        Ok(status)
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // An unreaped leader keeps its pid, so the group id cannot have been reused.
        if !self.reaped {
            #[cfg(unix)]
            kill_process_group(self.child.id());
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

#[cfg(unix)]
fn kill_process_group(leader: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if let Ok(pgid) = i32::try_from(leader) {
        let _ = killpg(Pid::from_raw(pgid), Signal::SIGKILL);
    }
}

/// A pipe that can be read by a reader thread.
trait OutputPipe: Read + Send + 'static {}

impl OutputPipe for ChildStdout {}
impl OutputPipe for ChildStderr {}

/// Starts a thread copying `pipe` into `events`; returns how many producers
/// were started (zero when the pipe is absent).
fn spawn_reader<P: OutputPipe>(
    device: &str,
    stream: &str,
    pipe: Option<P>,
    events: Sender<StreamEvent>,
) -> Result<usize, ShellError> {
    let Some(pipe) = pipe else {
        return Ok(0);
    };
    thread::Builder::new()
        .name(format!("{device}-{stream}"))
        .spawn(move || relay(pipe, &events))?;
    Ok(1)
}

fn relay(mut pipe: impl Read, events: &Sender<StreamEvent>) {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        let event = match pipe.read(&mut buffer) {
            Ok(0) => StreamEvent::Closed,
            Ok(read) => StreamEvent::Chunk(buffer[..read].to_vec()),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => StreamEvent::Failed(error),
        };
        let last = !matches!(event, StreamEvent::Chunk(_));
        if events.send(event).is_err() || last {
            return;
        }
    }
}
