//! Command-line behaviour: argument handling, exit codes, end-to-end runs

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIAL_VARS: [&str; 5] = [
    "TWITTER_BEARER_TOKEN",
    "TWITTER_API_KEY",
    "TWITTER_API_SECRET",
    "TWITTER_ACCESS_TOKEN",
    "TWITTER_ACCESS_SECRET",
];

/// Command isolated from the caller's environment and config
fn likecast(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("likecast").unwrap();
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("LIKECAST_PASSWORD")
        .env("LIKECAST_CONFIG", config)
        .env("LIKECAST_LOG_LEVEL", "error");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn credentials_config(api_base: &str) -> String {
    format!(
        r#"
[twitter]
api_base = "{}"
bearer_token = "bearer"
api_key = "key"
api_secret = "secret"
access_token = "token"
access_secret = "token-secret"
"#,
        api_base
    )
}

#[test]
fn test_help() {
    Command::cargo_bin("likecast")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Like tweets"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("preview"));
}

#[test]
fn test_like_requires_tweet_id() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    likecast(&config).arg("like").assert().failure().code(2);
}

#[test]
fn test_invalid_tweet_id_exits_3() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    likecast(&config)
        .args(["preview", "not-a-number"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Invalid tweet ID"));
}

#[test]
fn test_missing_credentials_exits_3() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "");

    let output = likecast(&config).arg("whoami").output().unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Missing Twitter credentials"));
    assert!(stderr.contains("bearer_token"));
    assert!(String::from_utf8(output.stdout).unwrap().trim().is_empty());
}

#[test]
fn test_wrong_password_exits_2() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[app]\npassword = \"hunter2\"\n");

    likecast(&config)
        .args(["--password", "hunter3", "whoami"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Password incorrect"));
}

#[test]
fn test_password_required_without_terminal() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "[app]\npassword = \"hunter2\"\n");

    likecast(&config)
        .arg("whoami")
        .write_stdin("")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Password required"));
}

#[test]
fn test_unreadable_config_exits_1() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("absent.toml");

    likecast(&config)
        .arg("whoami")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_against_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "1001", "username": "likecaster" }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &credentials_config(&server.uri()));

    likecast(&config)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("@likecaster (1001)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_credentials_exit_2() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &credentials_config(&server.uri()));

    likecast(&config).arg("whoami").assert().failure().code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_like_rate_limited_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "1001", "username": "likecaster" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "42", "text": "hello" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/users/1001/likes"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "60"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &credentials_config(&server.uri()));

    // The second like of 42 is refused locally without reaching the server
    let output = likecast(&config)
        .args(["--format", "json", "like", "42", "42"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    for result in results {
        assert_eq!(result["error"], "rate_limited");
        assert_eq!(result["liked"], false);
    }
    assert!(value["status"]["active_limit"]["reset_at"].is_i64());
}
