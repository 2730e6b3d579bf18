//! Binary smoke tests for the `conlog` CLI.
//!
//! These run the compiled binary end to end: real source files, a real
//! workspace directory, and a scratch CONLOG_DIR per test so config and
//! event files never leak between tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

const SIZE_MARKER: &str = "\nACID: log truncated (size exceeded)\n";
const TIMEOUT_MARKER: &str = "\nACID: log truncated (timeout)\n";

#[allow(deprecated)] // cargo_bin works fine for our use case
fn conlog() -> Command {
    let mut cmd = Command::cargo_bin("conlog").unwrap();
    cmd.timeout(Duration::from_secs(60));
    cmd
}

/// Temp layout: `state/` for CONLOG_DIR, `ws/` as the workspace, and
/// `source.log` holding `content`.
fn temp_layout(content: &str) -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state");
    let ws = dir.path().join("ws");
    fs::create_dir_all(&state).unwrap();
    fs::create_dir_all(&ws).unwrap();
    let src = dir.path().join("source.log");
    fs::write(&src, content).unwrap();
    (dir, state, ws, src)
}

/// 500 bytes of log-looking content (50 lines of 10 bytes).
fn small_log() -> String {
    (0..50).map(|i| format!("line {i:04}\n")).collect()
}

// ── Binary builds and runs ──────────────────────────────────────────────────

#[test]
fn binary_exists() {
    conlog();
}

// ── Version ─────────────────────────────────────────────────────────────────

#[test]
fn version_subcommand() {
    conlog()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("conlog "));
}

#[test]
fn version_flag() {
    conlog()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("conlog "));
}

// ── Help ────────────────────────────────────────────────────────────────────

#[test]
fn help_flag() {
    conlog()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "conlog copies a (possibly still growing) console log",
        ));
}

#[test]
fn help_lists_subcommands() {
    let output = conlog().arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    for cmd in &["copy", "doctor", "version"] {
        assert!(stdout.contains(cmd), "help should list the '{cmd}' subcommand");
    }
}

#[test]
fn unknown_subcommand_fails() {
    conlog()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ── Plain copy ──────────────────────────────────────────────────────────────

#[test]
fn copy_writes_the_whole_source() {
    let (_dir, state, ws, src) = temp_layout(&small_log());

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .assert()
        .success()
        .stdout(predicate::str::contains("started"))
        .stdout(predicate::str::contains("successfully"));

    let copied = fs::read_to_string(ws.join("console.log")).unwrap();
    assert_eq!(copied, small_log());
    assert!(!copied.contains("ACID"));
}

#[test]
fn copy_exit_code_is_zero_on_success() {
    let (_dir, state, ws, src) = temp_layout("hello\n");

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .assert()
        .code(0);
}

// ── Size limit ──────────────────────────────────────────────────────────────

#[test]
fn size_limit_truncates_with_marker() {
    let big = "x".repeat(10_000);
    let (_dir, state, ws, src) = temp_layout(&big);

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .args(["--size-limit", "1000"])
        .env("CONLOG_DIR", &state)
        .assert()
        .success()
        .stdout(predicate::str::contains("Reached log size limit of 1000 bytes"));

    // The one read that crossed the limit lands in full, then the marker.
    let copied = fs::read_to_string(ws.join("console.log")).unwrap();
    assert_eq!(copied.len(), 10_000 + SIZE_MARKER.len());
    assert!(copied.ends_with(SIZE_MARKER));
}

#[test]
fn source_exactly_at_the_limit_is_not_truncated() {
    let exact = "y".repeat(1000);
    let (_dir, state, ws, src) = temp_layout(&exact);

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .args(["--size-limit", "1000"])
        .env("CONLOG_DIR", &state)
        .assert()
        .success();

    let copied = fs::read_to_string(ws.join("console.log")).unwrap();
    assert_eq!(copied, exact);
}

// ── Blocking copies ─────────────────────────────────────────────────────────

#[test]
fn blocking_copy_times_out_on_a_growing_log() {
    let (_dir, state, ws, src) = temp_layout("start\n");

    // Keep the source growing for longer than the timeout.
    let appender_src = src.clone();
    let appender = thread::spawn(move || {
        for i in 0..25 {
            thread::sleep(Duration::from_millis(200));
            if let Ok(mut f) = OpenOptions::new().append(true).open(&appender_src) {
                let _ = writeln!(f, "line {i}");
            }
        }
    });

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .args(["--block", "--timeout", "2"])
        .env("CONLOG_DIR", &state)
        .assert()
        .success()
        .stdout(predicate::str::contains("Timeout exceeded (2 seconds)"));

    appender.join().unwrap();

    let copied = fs::read_to_string(ws.join("console.log")).unwrap();
    assert!(copied.ends_with(TIMEOUT_MARKER));
    assert!(copied.starts_with("start\n"));
}

#[test]
fn blocking_copy_completes_when_the_log_stops_growing() {
    let (_dir, state, ws, src) = temp_layout("start\n");

    let appender_src = src.clone();
    let appender = thread::spawn(move || {
        for i in 0..5 {
            thread::sleep(Duration::from_millis(200));
            if let Ok(mut f) = OpenOptions::new().append(true).open(&appender_src) {
                let _ = writeln!(f, "tail {i}");
            }
        }
    });
    appender.join().unwrap();

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .args(["--block", "--timeout", "300"])
        .env("CONLOG_DIR", &state)
        .assert()
        .success()
        .stdout(predicate::str::contains("successfully"));

    let copied = fs::read_to_string(ws.join("console.log")).unwrap();
    assert!(copied.contains("tail 4"));
    assert!(!copied.contains("ACID"));
}

// ── Failure is unstable, not fatal ──────────────────────────────────────────

#[test]
fn missing_source_is_unstable() {
    let (_dir, state, ws, _src) = temp_layout("");
    let missing = ws.join("no-such-source.log");

    conlog()
        .arg("copy")
        .arg(&missing)
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed"));
}

#[test]
fn destination_outside_the_workspace_is_unstable() {
    let (dir, state, ws, src) = temp_layout("data\n");

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("../escape.log")
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("../escape.log failed"));

    assert!(!dir.path().join("escape.log").exists());
}

// ── Expansion, config, and env ──────────────────────────────────────────────

#[test]
fn destination_placeholders_expand() {
    let (_dir, state, ws, src) = temp_layout("tagged\n");

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("logs/$BUILD_TAG.txt")
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .env("BUILD_TAG", "jenkins-demo-42")
        .assert()
        .success()
        .stdout(predicate::str::contains("logs/jenkins-demo-42.txt"));

    assert!(ws.join("logs/jenkins-demo-42.txt").exists());
}

#[test]
fn config_file_sets_the_destination() {
    let (_dir, state, ws, src) = temp_layout("configured\n");
    fs::write(state.join("config"), "file_name=from-config.log\n").unwrap();

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .assert()
        .success();

    assert!(ws.join("from-config.log").exists());
}

#[test]
fn env_var_overrides_the_config_file() {
    let (_dir, state, ws, src) = temp_layout("override\n");
    fs::write(state.join("config"), "file_name=from-config.log\n").unwrap();

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .env("CONLOG_FILE_NAME", "from-env.log")
        .assert()
        .success();

    assert!(ws.join("from-env.log").exists());
    assert!(!ws.join("from-config.log").exists());
}

#[test]
fn disabled_step_copies_nothing_and_succeeds() {
    let (_dir, state, ws, src) = temp_layout("should not appear\n");

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .env("CONLOG_ENABLED", "false")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    assert!(!ws.join("console.log").exists());
}

// ── Report and events ───────────────────────────────────────────────────────

#[test]
fn json_flag_prints_the_step_report() {
    let (_dir, state, ws, src) = temp_layout("abc");

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .arg("--json")
        .env("CONLOG_DIR", &state)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\":\"success\""))
        .stdout(predicate::str::contains("\"outcome\":\"complete\""))
        .stdout(predicate::str::contains("\"bytes_copied\":3"));
}

#[test]
fn events_are_recorded_under_the_conlog_dir() {
    let (_dir, state, ws, src) = temp_layout("evented\n");

    conlog()
        .arg("copy")
        .arg(&src)
        .arg("--workspace")
        .arg(&ws)
        .env("CONLOG_DIR", &state)
        .assert()
        .success();

    let events = fs::read_to_string(state.join("logs/copy.log")).unwrap();
    assert!(events.contains("copy_start"));
    assert!(events.contains("copy_result"));
}

// ── Doctor ──────────────────────────────────────────────────────────────────

#[test]
fn doctor_passes_on_a_valid_config() {
    let (_dir, state, _ws, _src) = temp_layout("");
    fs::write(state.join("config"), "size_limit=2048\nblock=true\n").unwrap();

    conlog()
        .arg("doctor")
        .env("CONLOG_DIR", &state)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"))
        .stdout(predicate::str::contains("All checks passed"));
}

#[test]
fn doctor_suggests_a_close_key_for_typos() {
    let (_dir, state, _ws, _src) = temp_layout("");
    fs::write(state.join("config"), "file_nmae=out.log\n").unwrap();

    conlog()
        .arg("doctor")
        .env("CONLOG_DIR", &state)
        .assert()
        .success()
        .stdout(predicate::str::contains("did you mean \"file_name\""));
}

#[test]
fn doctor_fails_on_an_invalid_value() {
    let (_dir, state, _ws, _src) = temp_layout("");
    fs::write(state.join("config"), "timeout=abc\n").unwrap();

    conlog()
        .arg("doctor")
        .env("CONLOG_DIR", &state)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("ERR"))
        .stderr(predicate::str::contains("doctor found"));
}
