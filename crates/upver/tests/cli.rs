//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PATTERN: &str = r#"VERSION\s*=\s*"(?<version>[^"]+)""#;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("UPVER_LOG_PATH")
        .env_remove("UPVER_LOG_DIR");
    cmd
}

/// A project directory with a version file and no config.
fn project(version_line: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("version.py"), format!("# generated\n{version_line}\n")).unwrap();
    tmp
}

fn next_in(tmp: &TempDir) -> Command {
    let mut cmd = cmd();
    cmd.args(["-C", tmp.path().to_str().unwrap(), "next"])
        .args(["--version-file", "version.py", "--version-pattern", PATTERN]);
    cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("next"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn next_help_lists_overrides() {
    cmd()
        .args(["next", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--version-file"))
        .stdout(predicate::str::contains("--version-pattern"))
        .stdout(predicate::str::contains("--default-revision"))
        .stdout(predicate::str::contains("--latest"));
}

// =============================================================================
// Next Command
// =============================================================================

#[test]
fn next_seeds_default_revision_for_new_upstream() {
    let tmp = project(r#"VERSION = "3.4.5""#);
    next_in(&tmp)
        .args(["--latest", "3.3.0", "--default-revision", "7"])
        .assert()
        .success()
        .stdout("3.4.5-7\n");
}

#[test]
fn next_increments_existing_prerelease() {
    let tmp = project(r#"VERSION = "3.4.5""#);
    next_in(&tmp)
        .args(["--latest", "3.4.5-7"])
        .assert()
        .success()
        .stdout("3.4.5-8\n");
}

#[test]
fn next_defaults_revision_to_one() {
    let tmp = project(r#"VERSION = "2.0""#);
    next_in(&tmp)
        .args(["--latest", "v1.9.3-4"])
        .assert()
        .success()
        .stdout("2.0.0-1\n");
}

#[test]
fn next_json_reports_decision() {
    let tmp = project(r#"VERSION = "3.4.5""#);
    let output = next_in(&tmp)
        .args(["--latest", "3.3.0", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("next --json should output valid JSON");
    assert_eq!(json["latest"], "3.3.0");
    assert_eq!(json["upstream"], "3.4.5");
    assert_eq!(json["diff"], "minor");
    assert_eq!(json["next"], "3.4.5-1");
}

#[test]
fn next_explain_shows_difference() {
    let tmp = project(r#"VERSION = "3.4.5""#);
    next_in(&tmp)
        .args(["--latest", "3.4.5-2", "--explain", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3.4.5-3"))
        .stdout(predicate::str::contains("prerelease"));
}

#[test]
fn next_rejects_upstream_prerelease() {
    let tmp = project(r#"VERSION = "3.4.5-beta""#);
    next_in(&tmp)
        .args(["--latest", "3.4.4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pre-release"));
}

#[test]
fn next_reports_missing_pattern_match() {
    let tmp = project("nothing to see");
    next_in(&tmp)
        .args(["--latest", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find version pattern"));
}

#[test]
fn next_reports_missing_capture_group() {
    let tmp = project(r#"VERSION = "1.0.0""#);
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "next", "--latest", "1.0.0"])
        .args(["--version-file", "version.py", "--version-pattern", r#"VERSION = "([^"]+)""#])
        .assert()
        .failure()
        .stderr(predicate::str::contains("named capture group 'version'"));
}

#[test]
fn next_reports_unparseable_upstream() {
    let tmp = project(r#"VERSION = "unknown""#);
    next_in(&tmp)
        .args(["--latest", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown"));
}

#[test]
fn next_requires_version_file() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "next", "--latest", "1.0.0"])
        .args(["--version-pattern", PATTERN])
        .assert()
        .failure()
        .stderr(predicate::str::contains("version_file"));
}

#[test]
fn next_fails_on_missing_file() {
    let tmp = TempDir::new().unwrap();
    next_in(&tmp)
        .args(["--latest", "1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("version.py"));
}

#[test]
fn next_is_idempotent() {
    let tmp = project(r#"VERSION = "3.4.5""#);
    let first = next_in(&tmp).args(["--latest", "3.4.5-1"]).output().unwrap();
    let second = next_in(&tmp).args(["--latest", "3.4.5-1"]).output().unwrap();
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(first.stdout, b"3.4.5-2\n");
}

/// Messages of every JSONL entry written under `dir` (the appender adds a
/// date suffix to the file name).
fn logged_messages(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| fs::read_to_string(entry.unwrap().path()).unwrap())
        .flat_map(|contents| {
            contents
                .lines()
                .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
                .filter_map(|entry| entry["message"].as_str().map(str::to_string))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn next_logs_each_decision_step() {
    let tmp = project(r#"VERSION = "3.4.5""#);
    let logs = TempDir::new().unwrap();

    next_in(&tmp)
        .env("UPVER_LOG_PATH", logs.path().join("upver.jsonl"))
        .args(["--latest", "3.3.0"])
        .assert()
        .success()
        .stdout("3.4.5-1\n");

    let messages = logged_messages(logs.path());
    for expected in [
        "normalized latest version",
        "extracted upstream version from source file",
        "normalized upstream version",
        "determined increment version",
    ] {
        assert!(
            messages.iter().any(|m| m == expected),
            "missing log event {expected:?} in {messages:?}"
        );
    }
}

#[test]
fn next_log_entries_carry_versions() {
    let tmp = project(r#"VERSION = "3.4.5""#);
    let logs = TempDir::new().unwrap();

    next_in(&tmp)
        .env("UPVER_LOG_PATH", logs.path().join("upver.jsonl"))
        .args(["--latest", "3.4.5-2"])
        .assert()
        .success();

    let entries: Vec<serde_json::Value> = fs::read_dir(logs.path())
        .unwrap()
        .flat_map(|entry| {
            fs::read_to_string(entry.unwrap().path())
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
                .collect::<Vec<_>>()
        })
        .collect();
    let decision = entries
        .iter()
        .find(|e| e["message"] == "determined increment version")
        .expect("decision is logged");
    assert_eq!(decision["level"], "info");
    assert_eq!(decision["service"], "upver");
    assert_eq!(decision["to"], "3.4.5-3");
    assert_eq!(decision["diff"], "prerelease");
}

// =============================================================================
// Upstream Command
// =============================================================================

#[test]
fn upstream_prints_normalized_version() {
    let tmp = project(r#"VERSION = "v4.1""#);
    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "upstream"])
        .args(["--version-file", "version.py", "--version-pattern", PATTERN])
        .assert()
        .success()
        .stdout("4.1.0\n");
}

// =============================================================================
// Info & Global Flags
// =============================================================================

#[test]
fn info_json_outputs_valid_json() {
    let output = cmd().args(["info", "--json"]).assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("info --json should output valid JSON");

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn global_flags_accepted() {
    for flags in [["-q", "info"], ["-vv", "info"], ["--color=never", "info"]] {
        cmd().args(flags).assert().success();
    }
}

#[test]
fn no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn invalid_subcommand_shows_error() {
    cmd()
        .arg("not-a-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn chdir_nonexistent_fails() {
    cmd()
        .args(["-C", "/nonexistent/path/that/does/not/exist", "info"])
        .assert()
        .failure();
}
