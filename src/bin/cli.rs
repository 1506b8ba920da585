//! Command-line front-end: run one command through a process-backed device
//! and stream its output.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::builder::OsStringValueParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use logging::{Log, LogConfig, LogLayer, LogLevel, WriterOutput, log_info};
use shell::{LineReceiver, ProcessDevice, ShellEnabledDevice, ShellError, ShellOutputReceiver};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Tag for the front-end's own log messages and hex dumps.
const TAG: &str = "devkit";

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("devkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run a command on a device with overall and inactivity timeouts.")
        .arg(
            Arg::new("level")
                .long("level")
                .short('l')
                .value_name("LEVEL")
                .help("Minimum log level (verbose, debug, info, warn, error, assert or V/D/I/W/E/A).")
                .value_parser(|value: &str| value.parse::<LogLevel>()),
        )
        .arg(
            Arg::new("hex-dump")
                .long("hex-dump")
                .help("Hex-dump every output chunk at debug level.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Abort when the command runs longer than SECS (0 = unbounded).")
                .value_parser(value_parser!(u64))
                .default_value("0"),
        )
        .arg(
            Arg::new("idle-timeout")
                .long("idle-timeout")
                .value_name("SECS")
                .help("Abort when the command is silent for SECS (0 = unbounded).")
                .value_parser(value_parser!(u64))
                .default_value("0"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .value_name("ARG")
                .help("Run ARG... followed by the command words instead of `sh -c`.")
                .value_parser(OsStringValueParser::new())
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .value_name("NAME")
                .help("Device name used in diagnostics.")
                .default_value("local"),
        )
        .arg(
            Arg::new("command")
                .value_name("COMMAND")
                .help("Command text to run.")
                .required(true)
                .num_args(1..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
}

/// Parsed invocation.
#[derive(Debug)]
struct Invocation {
    config: LogConfig,
    timeout: Duration,
    idle_timeout: Duration,
    prefix: Vec<OsString>,
    name: String,
    command: String,
}

impl Invocation {
    fn from_matches(matches: &ArgMatches, base: LogConfig) -> Self {
        let mut config = base;
        if let Some(level) = matches.get_one::<LogLevel>("level") {
            config.level = *level;
        }
        if matches.get_flag("hex-dump") {
            config.hex_dump = true;
        }

        let seconds = |id: &str| Duration::from_secs(matches.get_one::<u64>(id).copied().unwrap_or(0));
        let command = matches
            .get_many::<String>("command")
            .map(|words| words.map(String::as_str).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        Self {
            config,
            timeout: seconds("timeout"),
            idle_timeout: seconds("idle-timeout"),
            prefix: matches
                .get_many::<OsString>("prefix")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            name: matches
                .get_one::<String>("name")
                .cloned()
                .unwrap_or_else(|| String::from("local")),
            command,
        }
    }

    fn device(&self, log: Arc<Log>) -> ProcessDevice {
        let device = if self.prefix.is_empty() {
            ProcessDevice::shell(self.name.as_str())
        } else {
            ProcessDevice::with_prefix(self.name.as_str(), self.prefix.iter().cloned())
        };
        device.with_log(log)
    }
}

/// Forwards output to a line printer and hex-dumps each raw chunk.
struct DumpingReceiver<'a, R> {
    lines: R,
    log: &'a Log,
}

impl<R: ShellOutputReceiver> ShellOutputReceiver for DumpingReceiver<'_, R> {
    fn add_output(&mut self, chunk: &[u8]) {
        self.log
            .hex_dump(TAG, LogLevel::Debug, chunk, 0, chunk.len());
        self.lines.add_output(chunk);
    }

    fn flush(&mut self) {
        self.lines.flush();
    }

    fn is_cancelled(&self) -> bool {
        self.lines.is_cancelled()
    }
}

/// Installs a tracing subscriber that forwards into `log`, filtered by `RUST_LOG`.
fn install_tracing(log: &Arc<Log>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(LogLayer::new(Arc::clone(log)))
        .try_init();
}

/// Parses `args`, runs the command and maps the outcome onto an exit code.
#[must_use]
pub fn run_with<I, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let matches = match clap_command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => {
            let code = error.exit_code();
            let rendered = error.render().to_string();
            let _ = match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => stdout.write_all(rendered.as_bytes()),
                _ => stderr.write_all(rendered.as_bytes()),
            };
            return ExitCode::from(u8::try_from(code).unwrap_or(1));
        }
    };

    let invocation = Invocation::from_matches(&matches, LogConfig::from_env());
    let log = Arc::new(Log::with_console(
        invocation.config,
        Arc::new(WriterOutput::new(io::stderr())),
    ));
    let _ = logging::install_global(Arc::clone(&log));
    install_tracing(&log);

    let device = invocation.device(Arc::clone(&log));
    log_info!(
        log,
        TAG,
        "running '{}' on {} (timeout {:?}, idle timeout {:?})",
        invocation.command,
        device.name(),
        invocation.timeout,
        invocation.idle_timeout
    );

    let result = {
        let mut receiver = DumpingReceiver {
            lines: LineReceiver::new(|line: &str| {
                let _ = writeln!(stdout, "{line}");
            }),
            log: &log,
        };
        device.execute_shell_command_with_timeout(
            &invocation.command,
            &mut receiver,
            invocation.timeout,
            invocation.idle_timeout,
        )
    };
    let _ = stdout.flush();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(&log, &error, stderr),
    }
}

fn report<Err: Write>(log: &Log, error: &ShellError, stderr: &mut Err) -> ExitCode {
    log.error_failure(TAG, Some(error));
    let _ = writeln!(stderr, "devkit: {error}");
    ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(1))
}
