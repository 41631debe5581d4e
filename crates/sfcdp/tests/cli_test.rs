//! Integration tests for the `sfcdp` CLI binary.
//!
//! Argument parsing, help output, completions and usage errors run with no
//! network at all. The end-to-end tests point `--loginurl` at a wiremock
//! server that plays both the login host and the Data Cloud tenant.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../sfcdp-api/tests/fixtures/test_key.pem"
);

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `sfcdp` binary with env isolation.
///
/// Clears all `SFCDP_*` env vars and points the config file at a path
/// inside `config_dir` so tests never touch the user's real configuration.
fn sfcdp_cmd(config_dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sfcdp");
    cmd.env("SFCDP_CONFIG", config_dir.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("SFCDP_PROFILE")
        .env_remove("SFCDP_OUTPUT")
        .env_remove("SFCDP_TIMEOUT")
        .env_remove("SFCDP_CA_CERT")
        .env_remove("SFCDP_CLIENT_ID")
        .env_remove("SFCDP_USERNAME")
        .env_remove("SFCDP_LOGIN_URL")
        .env_remove("SFCDP_PRIVATE_KEY")
        .env_remove("RUST_LOG");
    cmd
}

/// `sfcdp_cmd` with full credentials aimed at `server`.
fn authed_cmd(config_dir: &Path, server: &MockServer, subcommand: &str) -> assert_cmd::Command {
    let mut cmd = sfcdp_cmd(config_dir);
    cmd.args([
        subcommand,
        "-i",
        "3MVG9-consumer-key",
        "-u",
        "etl@example.com",
        "-r",
        &server.uri(),
        "-k",
        TEST_KEY,
    ]);
    cmd
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

async fn mount_tokens(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "00Dxx0000001gPL!AR8AQJXg5oj8jXSgxJfA0lBog.39AsX.LVpxezPwuX5VAIrrbbHMuol7GQxnMeYMN7cj8EoXr5I9o",
            "instance_url": server.uri(),
            "token_type": "Bearer",
            "scope": "cdp_query_api api",
            "id": "https://login.salesforce.com/id/00Dxx0000001gPLEAY/005xx000001Sv6AAAS"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/services/a360/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "eyJraWQiOiJDT1JFLjAwRHh4MDAwMDAwMWdQTC",
            "instance_url": server.uri(),
            "token_type": "Bearer",
            "issued_token_type": "urn:ietf:params:oauth:token-type:jwt",
            "expires_in": 7191
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, offset: u64, data: serde_json::Value, done: bool) {
    Mock::given(method("POST"))
        .and(path("/api/v1/query"))
        .and(body_partial_json(json!({ "offset": offset, "limit": 50_000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {
                "name": { "placeInOrder": 1, "type": "VARCHAR" },
                "id": { "placeInOrder": 0, "type": "DECIMAL" }
            },
            "data": data,
            "done": done
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = sfcdp_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("login")
            .and(predicate::str::contains("metadata"))
            .and(predicate::str::contains("query")),
    );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sfcdp"));
}

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Usage errors ────────────────────────────────────────────────────

#[test]
fn test_query_requires_sql() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["query", "-i", "id", "-u", "me@example.com", "-k", TEST_KEY])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--query"));
}

#[test]
fn test_metadata_rejects_unknown_type() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["metadata", "-t", "TABLE"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_client_id_without_profile() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["login", "-u", "me@example.com", "-k", TEST_KEY])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing client id"));
}

#[test]
fn test_missing_key_file() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args([
            "login",
            "-i",
            "id",
            "-u",
            "me@example.com",
            "-k",
            "/nonexistent/server.key",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot read private key"));
}

#[test]
fn test_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["-p", "ghost", "login"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Profile 'ghost' not found"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_override() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_and_use() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["-p", "sandbox", "config", "set", "username", "dev@example.com"])
        .assert()
        .success();
    sfcdp_cmd(dir.path())
        .args(["config", "use", "sandbox"])
        .assert()
        .success();
    sfcdp_cmd(dir.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sandbox *"));

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("default_profile = \"sandbox\""));
    assert!(written.contains("username = \"dev@example.com\""));
}

#[test]
fn test_config_use_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    sfcdp_cmd(dir.path())
        .args(["config", "use", "nope"])
        .assert()
        .code(2);
}

// ── End to end against a mock Salesforce ────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_prints_both_token_tables() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let output = run(authed_cmd(dir.path(), &server, "login")).await;
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("Authenticated into core API"));
    assert!(out.contains("Exchanged access_token for Data Cloud access token"));
    assert!(out.contains("Response field"));
    assert!(out.contains("00Dxx0000001gPL!AR8A..."));
    assert!(!out.contains("LVpxezPwuX5VAIrrbbHMuol7GQxnMeYMN7cj8EoXr5I9o"));
    assert!(out.contains("7191"));
    assert!(stderr(&output).contains("/services/oauth2/token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_json_is_redacted() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = authed_cmd(dir.path(), &server, "login");
    cmd.arg("--json");
    let output = run(cmd).await;
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["data_cloud"]["expires_in"], 7191);
    assert_eq!(value["core"]["scope"], "cdp_query_api api");
    assert_eq!(value["data_cloud"]["access_token"], "eyJraWQiOiJDT1JFLjAw...");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_core_rejection_exits_with_auth_code_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "user hasn't approved this consumer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/services/a360/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let output = run(authed_cmd(dir.path(), &server, "metadata")).await;
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("Core token exchange failed"));
    assert!(err.contains("invalid_grant"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_metadata_entities_as_json() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metadata/"))
        .and(header(
            "authorization",
            "Bearer eyJraWQiOiJDT1JFLjAwRHh4MDAwMDAwMWdQTC",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": [
                {
                    "displayName": "Unified Individual",
                    "name": "Unified_IndividualBRK__dlm",
                    "fields": [{ "displayName": "Id", "name": "ssot__Id__c", "type": "STRING" }]
                },
                { "displayName": "Sales Order", "name": "SalesOrder__dll", "fields": [] }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = authed_cmd(dir.path(), &server, "metadata");
    cmd.args(["-t", "ENTITY", "-f", "Individual", "--json"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        json!([{
            "entityName": "Unified Individual",
            "entityApiName": "Unified_IndividualBRK__dlm",
            "entityType": "dlm"
        }])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_metadata_fields_need_entity_and_field_match() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/metadata/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": [
                {
                    "displayName": "Unified Individual",
                    "name": "Unified_IndividualBRK__dlm",
                    "fields": [
                        { "displayName": "Id", "name": "ssot__Id__c", "type": "STRING" },
                        { "displayName": "Birth Date", "name": "ssot__BirthDate__c", "type": "DATE" }
                    ]
                },
                {
                    "displayName": "Sales Order",
                    "name": "SalesOrder__dll",
                    "fields": [
                        { "displayName": "Birth Date", "name": "BirthDate__c", "type": "DATE" }
                    ]
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = authed_cmd(dir.path(), &server, "metadata");
    cmd.args(["-t", "FIELD", "-f", "Individual,BirthDate", "-o", "csv"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));

    assert_eq!(
        stdout(&output),
        "Entity name,Entity API name,Field name,Datatype,API Name\n\
         Unified Individual,Unified_IndividualBRK__dlm,Birth Date,DATE,ssot__BirthDate__c\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_csv_spans_pages_in_column_order() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_page(&server, 0, json!([{ "name": "Ada", "id": 1 }]), false).await;
    mount_page(&server, 50_000, json!([{ "name": "Grace", "id": 2 }]), true).await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = authed_cmd(dir.path(), &server, "query");
    cmd.args(["-q", "SELECT id, name FROM People__dlm", "-o", "csv"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "stderr:\n{}", stderr(&output));

    assert_eq!(stdout(&output), "id,name\n1,Ada\n2,Grace\n");
    assert!(stderr(&output).contains("2 row(s) in 2 page(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_failure_keeps_earlier_pages() {
    let server = MockServer::start().await;
    mount_tokens(&server).await;
    mount_page(&server, 0, json!([{ "name": "Ada", "id": 1 }]), false).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query"))
        .and(body_partial_json(json!({ "offset": 50_000 })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "errorCode": "INVALID_ARGUMENT",
            "message": "offset out of range"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = authed_cmd(dir.path(), &server, "query");
    cmd.args(["-q", "SELECT id, name FROM People__dlm", "-o", "plain"]);
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "1\tAda\n");
    let err = stderr(&output);
    assert!(err.contains("Query failed at offset 50000"));
    assert!(err.contains("INVALID_ARGUMENT"));
}
