//! CLI integration tests

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Variables that would otherwise feed settings into the binary
const SETTINGS_VARS: &[&str] = &[
    "CONTENTFUL_SPACE_ID",
    "CONTENTFUL_MANAGEMENT_TOKEN",
    "CFM_SPACE_ID",
    "CFM_TOKEN",
    "CFM_MODELS_PATH",
    "CFM_ENTRIES_PATH",
    "CFM_BASE_URL",
    "CFM_REQUESTS_PER_SECOND",
    "CFM_MAX_CONCURRENCY",
    "CFM_REQUEST_TIMEOUT_SECS",
    "RUST_LOG",
];

/// Run the built binary with a clean environment and an empty home
fn cfm(home: &TempDir, args: &[&str]) -> Output {
    cfm_with_env(home, args, &[])
}

fn cfm_with_env(home: &TempDir, args: &[&str], vars: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cfm"));
    command.args(args).env("HOME", home.path()).env("NO_COLOR", "1");
    for var in SETTINGS_VARS {
        command.env_remove(var);
    }
    command.envs(vars.iter().copied());
    command.output().expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = cfm(&home, &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Contentful Migrate"), "Should show app name");
    assert!(stdout.contains("content-types"), "Should show content-types command");
    assert!(stdout.contains("entries"), "Should show entries command");
    assert!(stdout.contains("seed"), "Should show seed command");
    assert!(stdout.contains("--space-id"), "Should show space-id option");
    assert!(stdout.contains("CONTENTFUL_SPACE_ID"), "Should show env var");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = cfm(&home, &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("cfm"), "Should show binary name");
}

/// Test format option
#[test]
fn test_format_option() {
    let home = TempDir::new().unwrap();
    let output = cfm(&home, &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let home = TempDir::new().unwrap();
    let output = cfm(&home, &["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

/// Test missing credentials error handling
#[test]
fn test_missing_space_id() {
    let home = TempDir::new().unwrap();
    let output = cfm(&home, &["--token", "secret", "content-types"]);

    assert!(!output.status.success(), "Missing space id should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("space id"), "Should name the missing setting");
}

/// Test that CFM_* variables are read when no flag is given
#[test]
fn test_space_id_from_cfm_env() {
    let home = TempDir::new().unwrap();
    let models = TempDir::new().unwrap();
    let models_path = models.path().to_string_lossy().into_owned();
    let output = cfm_with_env(
        &home,
        &["--token", "secret", "--models", &models_path, "--format", "json", "content-types"],
        &[("CFM_SPACE_ID", "space1")],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Empty models dir should sync: {stdout}");
    let outcomes: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcomes, serde_json::json!([]));
}

/// Test a full content type run against a mock API
#[test]
fn test_content_types_against_mock_api() {
    let mut server = mockito::Server::new();
    let home = TempDir::new().unwrap();
    let models = TempDir::new().unwrap();
    fs::write(
        models.path().join("tag.json"),
        r#"{"id":"tag","name":"Tag","fields":[{"id":"label","type":"Symbol"}]}"#,
    )
    .unwrap();

    let _probe = server
        .mock("GET", "/spaces/space1/content_types/tag")
        .with_status(404)
        .with_body(r#"{"sys":{"id":"NotFound"}}"#)
        .create();
    let _upsert = server
        .mock("PUT", "/spaces/space1/content_types/tag")
        .with_status(201)
        .with_body(r#"{"sys":{"id":"tag","version":1}}"#)
        .create();
    let _publish = server
        .mock("PUT", "/spaces/space1/content_types/tag/published")
        .match_header("x-contentful-version", "1")
        .with_status(200)
        .with_body(r#"{"sys":{"id":"tag","version":2}}"#)
        .create();

    let url = server.url();
    let models_path = models.path().to_string_lossy().into_owned();
    let output = cfm(
        &home,
        &[
            "--space-id",
            "space1",
            "--token",
            "secret",
            "--base-url",
            &url,
            "--models",
            &models_path,
            "--format",
            "json",
            "--print-metrics",
            "content-types",
        ],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Sync should succeed: {stdout}");
    let outcomes: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(outcomes[0]["id"], "tag");
    assert_eq!(outcomes[0]["publish"]["sys"]["version"], 2);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("cfm_requests_dispatched_total"),
        "Metrics should go to stderr"
    );
}

/// Test that a rejected content type fails the command
#[test]
fn test_content_type_failure_exits_non_zero() {
    let mut server = mockito::Server::new();
    let home = TempDir::new().unwrap();
    let models = TempDir::new().unwrap();
    fs::write(models.path().join("tag.json"), r#"{"id":"tag"}"#).unwrap();

    let _probe = server
        .mock("GET", "/spaces/space1/content_types/tag")
        .with_status(401)
        .with_body(r#"{"message":"The access token you sent could not be found or is invalid."}"#)
        .create();

    let url = server.url();
    let models_path = models.path().to_string_lossy().into_owned();
    let output = cfm(
        &home,
        &[
            "--space-id",
            "space1",
            "--token",
            "wrong",
            "--base-url",
            &url,
            "--models",
            &models_path,
            "content-types",
        ],
    );

    assert!(!output.status.success(), "Rejected sync should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("401"), "Should report the status");
}
