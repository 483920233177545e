//! Golden tests for JSON output stability
//!
//! Every command here runs without reaching a store: `resolve` never builds a
//! client and a single-key dry run plans without listing.
//!
//! Run with: `cargo test --features golden`

#![cfg(feature = "golden")]

use std::process::{Command, Output};

use tempfile::TempDir;

const AT: &str = "2024-03-01T00:00:00Z";

/// Isolated config dir pointing at a local endpoint with static credentials
fn setup_test_env() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        r#"
[store]
region = "us-east-1"
endpoint = "http://127.0.0.1:9"
force_path_style = true
access_key = "test-access"
secret_key = "test-secret"

[retry]
max_attempts = 1
"#,
    )
    .expect("Failed to write config");
    temp_dir
}

fn s3p(config_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_s3p"))
        .args(args)
        .env("S3P_CONFIG_DIR", config_dir.path())
        .env_remove("S3P_AT")
        .env_remove("S3P_TZ")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute s3p")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_resolve_json() {
    let dir = setup_test_env();
    let output = s3p(
        &dir,
        &[
            "resolve",
            "s3://bkt/in/{DATEID-1}/",
            "s3://bkt/snap/{DATETIMEID}/part.csv",
            "--at",
            AT,
            "--json",
        ],
    );

    assert!(output.status.success(), "resolve should succeed");
    insta::assert_json_snapshot!(stdout_json(&output), @r#"
    {
      "paths": [
        {
          "is_prefix": true,
          "kind": "DATEID",
          "literal": "s3://bkt/in/2024-02-29/",
          "offset_days": -1,
          "template": "s3://bkt/in/{DATEID-1}/"
        },
        {
          "is_prefix": false,
          "kind": "DATETIMEID",
          "literal": "s3://bkt/snap/2024-03-01_00-00-00/part.csv",
          "offset_days": 0,
          "template": "s3://bkt/snap/{DATETIMEID}/part.csv"
        }
      ],
      "reference": "2024-03-01T00:00:00Z"
    }
    "#);
}

#[test]
fn test_resolve_honours_timezone() {
    let dir = setup_test_env();
    let output = s3p(
        &dir,
        &["resolve", "s3://bkt/{DATEID}/", "--at", AT, "--tz=-05:00", "--json"],
    );

    assert!(output.status.success(), "resolve should succeed");
    let json = stdout_json(&output);
    assert_eq!(json["paths"][0]["literal"], "s3://bkt/2024-02-29/");
}

#[test]
fn test_cp_single_key_dry_run_json() {
    let dir = setup_test_env();
    let output = s3p(
        &dir,
        &[
            "cp",
            "s3://bkt/in/{DATEID-1}/data.csv",
            "s3://bkt/out/{DATEID}/data.csv",
            "--dry-run",
            "--at",
            AT,
            "--json",
        ],
    );

    assert!(output.status.success(), "dry run should succeed");
    insta::assert_json_snapshot!(stdout_json(&output), @r#"
    {
      "actions": [
        {
          "destination": {
            "bucket": "bkt",
            "key": "out/2024-03-01/data.csv"
          },
          "source": {
            "bucket": "bkt",
            "key": "in/2024-02-29/data.csv"
          },
          "verb": "copy"
        }
      ],
      "destination": "s3://bkt/out/2024-03-01/data.csv",
      "dry_run": true,
      "reference": "2024-03-01T00:00:00Z",
      "source": "s3://bkt/in/2024-02-29/data.csv",
      "verb": "copy"
    }
    "#);
}

#[test]
fn test_malformed_token_is_usage_error() {
    let dir = setup_test_env();
    let output = s3p(&dir, &["resolve", "s3://bkt/{DATEID-x}/", "--at", AT]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_ambiguous_destination_is_usage_error() {
    let dir = setup_test_env();
    let output = s3p(
        &dir,
        &["cp", "s3://bkt/in/{DATEID}/", "s3://bkt/out/file.csv", "--at", AT],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prefix"), "stderr: {stderr}");
}

#[test]
fn test_rm_prefix_requires_recursive() {
    let dir = setup_test_env();
    let output = s3p(&dir, &["rm", "s3://bkt/tmp/{DATEID}/", "--at", AT]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_nested_prefix_copy_is_usage_error() {
    let dir = setup_test_env();
    let output = s3p(
        &dir,
        &["cp", "s3://bkt/data/", "s3://bkt/data/{DATEID}/", "--at", AT],
    );
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("overlap"), "stderr: {stderr}");
}
