//! Integration tests for advctl
//!
//! Transcripts are synthesized with the test helpers, written to a temporary
//! directory and replayed through the binary. Exit codes: 0 pass, 1 fail,
//! 2 unusable input.

use std::fs;
use std::path::PathBuf;

use advscope_analysis::ScanTranscript;
use advscope_catalog::{CatalogSeries, DeviceProfile, TemplatePayloadBuilder};
use advscope_test_helpers::prelude::*;
use assert_cmd::Command;
use insta::assert_snapshot;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn advctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("advctl")?;
    cmd.env("NO_COLOR", "1").env("CLICOLOR", "0").env_remove("RUST_LOG").env_remove("ADVCTL_CONFIG");
    Ok(cmd)
}

fn write_json(dir: &TempDir, name: &str, value: &impl serde::Serialize) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}

/// Series E advertised exactly on schedule: 30 ms for 30 s.
fn ideal_e() -> Result<ScanTranscript, Box<dyn std::error::Error>> {
    let series = CatalogSeries::definitions(&[CatalogSeries::E]);
    let builder = TemplatePayloadBuilder::new(DeviceProfile::default());
    Ok(ideal_transcript(&series, &builder, None)?)
}

/// Series E payload sent every 25 ms instead of 30 ms.
fn wrong_interval_e() -> Result<ScanTranscript, Box<dyn std::error::Error>> {
    let mut transcript = ideal_e()?;
    for capture in transcript.devices.iter_mut().flat_map(|d| d.advertising.iter_mut()) {
        capture.timestamps_ns = span(0.0, 30.0, 25.0);
    }
    Ok(transcript)
}

#[test]
fn test_cli_help() -> TestResult {
    advctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("recorded BLE scan transcripts"));
    Ok(())
}

#[test]
fn test_cli_version() -> TestResult {
    advctl()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("advctl"));
    Ok(())
}

// Sequence

#[test]
fn test_sequence_pass() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &ideal_e()?)?;
    advctl()?
        .arg("sequence")
        .arg(&path)
        .args(["--series", "E"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("PASS advertising sequence"))
        .stdout(predicate::str::contains("E: pass"));
    Ok(())
}

#[test]
fn test_sequence_json_output() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &ideal_e()?)?;
    let output = advctl()?
        .args(["--json", "sequence"])
        .arg(&path)
        .args(["-s", "E"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));

    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["success"], true);
    assert_eq!(json["passed"], true);
    assert_eq!(json["observed_order"], serde_json::json!(["E"]));
    assert_eq!(json["statistics"][0]["series"], "E");
    assert!(json["verdicts"][0]["violations"].as_array().is_some_and(Vec::is_empty));
    Ok(())
}

#[test]
fn test_sequence_wrong_interval_fails() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &wrong_interval_e()?)?;
    advctl()?
        .arg("sequence")
        .arg(&path)
        .args(["-s", "E"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL advertising sequence"))
        .stdout(predicate::str::contains("interval error rate"));
    Ok(())
}

#[test]
fn test_sequence_with_profile() -> TestResult {
    let dir = TempDir::new()?;
    let scan = write_json(&dir, "scan.json", &ideal_e()?)?;
    let profile = write_json(&dir, "profile.json", &DeviceProfile::default())?;
    advctl()?
        .arg("sequence")
        .arg(&scan)
        .args(["-s", "E", "--profile"])
        .arg(&profile)
        .assert()
        .code(0);
    Ok(())
}

#[test]
fn test_sequence_unknown_address() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &ideal_e()?)?;
    advctl()?
        .arg("sequence")
        .arg(&path)
        .args(["-s", "E", "--address", "00:11:22:33:44:55"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No device 00:11:22:33:44:55"));
    Ok(())
}

#[test]
fn test_sequence_unknown_series() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &ideal_e()?)?;
    advctl()?
        .arg("sequence")
        .arg(&path)
        .args(["-s", "E,Z"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Z"));
    Ok(())
}

#[test]
fn test_sequence_invalid_config() -> TestResult {
    let dir = TempDir::new()?;
    let scan = write_json(&dir, "scan.json", &ideal_e()?)?;
    let config = write_json(&dir, "config.json", &serde_json::json!({ "parser": { "min_batch_len": 1 } }))?;
    advctl()?
        .arg("sequence")
        .arg(&scan)
        .args(["-s", "E", "--config"])
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("min_batch_len"));
    Ok(())
}

#[test]
fn test_missing_transcript() -> TestResult {
    advctl()?
        .args(["sequence", "/nonexistent/scan.json", "-s", "E"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot read"));
    Ok(())
}

#[test]
fn test_malformed_transcript_json_error() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("scan.json");
    fs::write(&path, r#"{"devices": [{"address": "nope"}]}"#)?;
    let output = advctl()?.args(["--json", "sequence"]).arg(&path).args(["-s", "E"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["success"], false);
    assert!(json["error"]["message"].as_str().is_some_and(|m| m.contains("Invalid JSON")));
    Ok(())
}

// Interval

#[test]
fn test_interval_pass() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &ideal_e()?)?;
    advctl()?
        .arg("interval")
        .arg(&path)
        .args(["-s", "E", "--check-all"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("PASS advertising intervals"));
    Ok(())
}

#[test]
fn test_interval_fail() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &wrong_interval_e()?)?;
    let output = advctl()?.args(["--json", "interval"]).arg(&path).args(["-s", "E"]).output()?;
    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["passed"], false);
    assert!(json["failure"].is_string());
    Ok(())
}

// Duration

#[test]
fn test_duration_within_tolerance() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &ideal_e()?)?;
    advctl()?
        .arg("duration")
        .arg(&path)
        .args(["--expected", "30"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Observed 29.970 s"));
    Ok(())
}

#[test]
fn test_duration_out_of_tolerance() -> TestResult {
    let dir = TempDir::new()?;
    let path = write_json(&dir, "scan.json", &ideal_e()?)?;
    advctl()?
        .arg("duration")
        .arg(&path)
        .args(["--expected", "60", "--tolerance", "2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL advertising duration"));
    Ok(())
}

// Catalog

#[test]
fn test_timeline_json_snapshot() -> TestResult {
    let output = advctl()?
        .args(["--json", "timeline", "-s", "E,F", "--horizon", "60"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert_snapshot!(String::from_utf8(output.stdout)?.trim_end(), @r#"
    {
      "success": true,
      "timeline": [
        {
          "series": "E",
          "start_s": 0.0,
          "stop_s": 30.0
        },
        {
          "series": "F",
          "start_s": 30.0,
          "stop_s": 60.0
        }
      ]
    }
    "#);
    Ok(())
}

#[test]
fn test_pairing_series() -> TestResult {
    advctl()?
        .args(["pairing-series", "--swift-pair", "--ble-pro"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Swift Pair + BLE Pro: E,F"));
    advctl()?
        .args(["pairing-series", "--swift-pair", "--prepairing"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Q,R,D"));
    Ok(())
}

#[test]
fn test_pairing_series_fast_pair_alone_is_undefined() -> TestResult {
    advctl()?
        .args(["pairing-series", "--fast-pair"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Fast Pair"));
    Ok(())
}
