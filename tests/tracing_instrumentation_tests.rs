//! Tests for the --debug tracing output

mod utils;

use std::process::Command;

fn get_binary_path() -> String {
    env!("CARGO_BIN_EXE_fs-usage-analyzer").to_string()
}

#[test]
fn test_debug_flag_accepted() {
    let output = Command::new(get_binary_path())
        .arg("--debug")
        .arg(utils::sample_trace())
        .output()
        .expect("Failed to execute");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert!(
        !stderr.contains("unknown") && !stderr.contains("unexpected"),
        "Debug flag was not accepted: {}",
        stderr
    );
}

#[test]
fn test_debug_output_to_stderr() {
    let output = Command::new(get_binary_path())
        .arg("--debug")
        .arg(utils::sample_trace())
        .output()
        .expect("Failed to execute");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("DEBUG") || stderr.contains("INFO"),
        "No tracing output found in stderr: {}",
        stderr
    );
    assert!(stderr.contains("parsed trace"), "missing summary event: {}", stderr);
}

#[test]
fn test_debug_shows_chunk_progress() {
    let output = Command::new(get_binary_path())
        .args(["--debug", "--chunk-lines", "4"])
        .arg(utils::sample_trace())
        .output()
        .expect("Failed to execute");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.matches("parsed chunk").count() >= 3,
        "expected one event per chunk: {}",
        stderr
    );
}

#[test]
fn test_debug_bins_emit_trace() {
    let output = Command::new(get_binary_path())
        .args(["--debug", "--bins"])
        .arg(utils::sample_trace())
        .output()
        .expect("Failed to execute");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TRACE"), "no TRACE events: {}", stderr);
    assert!(stderr.contains("binned entries"), "{}", stderr);
}

#[test]
fn test_no_tracing_without_debug() {
    let output = Command::new(get_binary_path())
        .arg(utils::sample_trace())
        .output()
        .expect("Failed to execute");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("DEBUG") && !stderr.contains("TRACE"),
        "Tracing output without --debug: {}",
        stderr
    );
    // stdout stays clean in both modes
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Entries:"));
}
