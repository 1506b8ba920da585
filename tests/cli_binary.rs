use std::fs;
use std::process::Command;

fn binary_output(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_devkit"))
        .args(args)
        .env_remove("DEVKIT_LOG_LEVEL")
        .env_remove("DEVKIT_LOG_HEXDUMP")
        .output()
        .unwrap_or_else(|error| panic!("failed to run devkit: {error}"))
}

#[test]
fn help_lists_usage() {
    let output = binary_output(&["--help"]);
    assert!(output.status.success(), "--help should succeed");
    assert!(output.stderr.is_empty(), "help output should not write to stderr");
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--idle-timeout"));
}

#[test]
fn missing_command_shows_usage() {
    let output = binary_output(&[]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).expect("stderr is UTF-8");
    assert!(stderr.contains("Usage:"));
}

#[cfg(unix)]
#[test]
fn output_goes_to_stdout_and_diagnostics_to_stderr() {
    let output = binary_output(&["--level", "info", "--", "echo", "hello"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hello\n");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(" I/devkit: running 'echo hello' on local"));
}

#[cfg(unix)]
#[test]
fn hex_dump_flag_dumps_chunks_at_debug() {
    let output = binary_output(&["--level", "D", "--hex-dump", "--", "printf", "A"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(" D/devkit: 0000- 41 "));
}

#[cfg(unix)]
#[test]
fn inactivity_timeout_exit_code() {
    let output = binary_output(&["--idle-timeout", "1", "--", "echo", "start;", "sleep", "10"]);
    assert_eq!(output.status.code(), Some(31));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "start\n");
}

#[cfg(unix)]
#[test]
fn unknown_program_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-installed");
    let output = binary_output(&[
        "--prefix",
        missing.to_str().unwrap(),
        "--",
        "anything",
    ]);
    assert_eq!(output.status.code(), Some(127));
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
