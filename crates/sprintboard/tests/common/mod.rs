//! Common test utilities shared across integration tests.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Path of the sprintboard binary built for this test run
pub fn sprintboard_binary() -> &'static Path {
    Path::new(env!("CARGO_BIN_EXE_sprintboard"))
}

/// Run the sprintboard binary with colors and logging disabled
pub fn run_sprintboard(args: &[&str]) -> Output {
    run_sprintboard_with_input(args, "")
}

/// Run the sprintboard binary, feeding `input` on stdin
pub fn run_sprintboard_with_input(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(sprintboard_binary())
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute sprintboard binary");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child
        .wait_with_output()
        .expect("Failed to wait for sprintboard binary")
}

/// Stdout of a successful run, panicking with stderr otherwise
pub fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "sprintboard failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}
