//! Integration tests for the `docwallet` CLI binary.
//!
//! Argument parsing, help output, shell completions and the documents
//! commands against a temporary documents file. Share requests go to a
//! wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `docwallet` binary with env isolation.
///
/// Clears all `DOCWALLET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn docwallet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("docwallet");
    cmd.env("HOME", "/tmp/docwallet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/docwallet-cli-test-nonexistent")
        .env_remove("DOCWALLET_URL")
        .env_remove("DOCWALLET_TOKEN")
        .env_remove("DOCWALLET_DOCUMENTS")
        .env_remove("DOCWALLET_API__TOKEN")
        .env_remove("DOCWALLET_API__TOKEN_ENV")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn documents_file(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("documents.json");
    let documents = json!({
        "types": [
            { "code": "driver-license", "name": "Driver licence" },
            { "code": "vehicle-license", "name": "Vehicle registration", "stackName": "Vehicles" }
        ],
        "records": {
            "driver-license": [
                { "docStatus": 200, "id": "dl-1", "docNumber": "AAA 123456" }
            ],
            "vehicle-license": [
                { "docStatus": 200, "id": "v-1", "docNumber": "AA 0001 AA" },
                { "docStatus": 200, "id": "v-2", "docNumber": "AA 0002 AA" }
            ]
        },
        "order": ["vehicle-license", "driver-license"]
    });
    std::fs::write(&path, documents.to_string()).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = docwallet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    docwallet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("documents wallet")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("share")),
    );
}

#[test]
fn test_version_flag() {
    docwallet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("docwallet"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    docwallet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_invalid_shell() {
    docwallet_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .code(2);
}

// ── Documents ───────────────────────────────────────────────────────

#[test]
fn test_list_plain_follows_type_order_and_ends_with_add_card() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["list", "-o", "plain", "-d"])
        .arg(&file)
        .assert()
        .success()
        .stdout("v-1,v-2\ndl-1\nadd-document\n");
}

#[test]
fn test_list_json_groups_members() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    let output = docwallet_cmd()
        .args(["list", "-o", "json", "-d"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["docType"], "vehicle-license");
    assert_eq!(entries[0]["members"].as_array().unwrap().len(), 2);
    assert_eq!(entries[1]["members"][0]["backFace"], "code");
    assert_eq!(entries[2]["name"], "(add document)");
}

#[test]
fn test_list_table_shows_type_names() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["list", "--color", "never", "-d"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Driver licence")
                .and(predicate::str::contains("Vehicle registration")),
        );
}

#[test]
fn test_list_missing_file_fails() {
    docwallet_cmd()
        .args(["list", "-d", "/tmp/docwallet-cli-test-nonexistent/documents.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("documents file"));
}

#[test]
fn test_stack_lists_members() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["stack", "vehicle-license", "-o", "plain", "-d"])
        .arg(&file)
        .assert()
        .success()
        .stdout("v-1\nv-2\n");
}

#[test]
fn test_stack_of_single_member_warns() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["stack", "driver-license", "--color", "never", "-d"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Only one document"));
}

#[test]
fn test_stack_unknown_type_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["stack", "passport", "-d"])
        .arg(&file)
        .assert()
        .failure()
        .code(4);
}

// ── Share ───────────────────────────────────────────────────────────

#[test]
fn test_share_without_token_exits_with_auth_code() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["share", "dl-1", "-d"])
        .arg(&file)
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("No API token"));
}

#[test]
fn test_share_unknown_document_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["share", "nope", "--token", "t", "-d"])
        .arg(&file)
        .assert()
        .failure()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_share_prints_the_verification_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/driver-license/dl-1/share"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "share-1",
            "link": "https://verify.example/abc",
            "timerTime": 180
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    let output = docwallet_cmd()
        .args(["share", "dl-1", "-o", "plain", "--token", "t", "--url", &server.uri(), "-d"])
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "https://verify.example/abc"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_share_registry_failure_exits_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/documents/vehicle-license/v-1/share"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "down" })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = documents_file(&dir);
    docwallet_cmd()
        .args(["share", "v-1", "--token", "t", "--url", &server.uri(), "-d"])
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("registry"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_a_toml_path() {
    docwallet_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_redacts_nothing_by_default() {
    docwallet_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[api]")
                .and(predicate::str::contains("base_url = \"http://localhost:8080\""))
                .and(predicate::str::contains("token =").not()),
        );
}
