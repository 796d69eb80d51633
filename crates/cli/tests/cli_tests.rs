//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "vperf-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("performance telemetry"),
        "Should show app description"
    );
    assert!(stdout.contains("config"), "Should show config command");
    assert!(stdout.contains("counters"), "Should show counters command");
    assert!(stdout.contains("entities"), "Should show entities command");
    assert!(stdout.contains("instances"), "Should show instances command");
    assert!(stdout.contains("intervals"), "Should show intervals command");
    assert!(stdout.contains("perf"), "Should show perf command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "vperf-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("vperf"), "Should show binary name");
}

/// Test entities subcommand help
#[test]
fn test_entities_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "vperf-cli", "--", "entities", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Entities help should succeed");
    assert!(
        stdout.contains("--entity-type"),
        "Should show entity-type option"
    );
    assert!(
        stdout.contains("--entity-name"),
        "Should show entity-name option"
    );
}

/// Test perf subcommand help
#[test]
fn test_perf_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "vperf-cli", "--", "perf", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Perf help should succeed");
    assert!(stdout.contains("--counter"), "Should show counter option");
    assert!(stdout.contains("--interval"), "Should show interval option");
    assert!(
        stdout.contains("--entity-id"),
        "Should show entity-id option"
    );
}

/// Config subcommand needs no endpoint and must print the defaults
#[test]
fn test_config_defaults_without_endpoint() {
    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "vperf-cli",
            "--",
            "--url",
            "https://unused.invalid",
            "--user",
            "x",
            "--password",
            "x",
            "--format",
            "yaml",
            "config",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Config should succeed offline");
    assert!(stdout.contains("cpu"), "Should list default counters");
    assert!(
        stdout.contains("HostSystem"),
        "Should list default object types"
    );
}
