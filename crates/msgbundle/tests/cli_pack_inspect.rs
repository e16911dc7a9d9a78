#![cfg(feature = "cli")]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

fn unique_temp_dir(tag: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "msgbundle-cli-{tag}-{}-{n}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn msgbundle(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_msgbundle"))
        .args(args)
        .env_remove("MSGBUNDLE_MAX_RECORD_SIZE")
        .env_remove("MSGBUNDLE_LOG")
        .output()
        .expect("run msgbundle")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn pack_fixture(dir: &Path) -> PathBuf {
    let input = dir.join("records.jsonl");
    fs::write(
        &input,
        concat!(
            "{\"offset\":5,\"timestamp\":100,\"content\":{\"n\":1}}\n",
            "\n",
            "{\"offset\":2,\"timestamp\":50,\"content\":\"two\",\"previous_offset\":1}\n",
            "{\"offset\":9,\"timestamp\":300,\"content\":[3],\"ttl\":60}\n",
        ),
    )
    .expect("write input");
    let out = dir.join("out.bundle");

    let output = msgbundle(&[
        "pack",
        input.to_str().unwrap(),
        "--stream",
        "sensors",
        "--partition",
        "2",
        "--out",
        out.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "pack failed: {output:?}");

    let report = stdout_json(&output);
    assert_eq!(report["count"], 3);
    assert_eq!(report["min_offset"], 2);
    assert_eq!(report["max_offset"], 9);
    assert_eq!(report["min_timestamp"], 50);
    assert_eq!(report["max_timestamp"], 300);
    out
}

#[test]
fn pack_then_inspect_round_trips() {
    let dir = unique_temp_dir("roundtrip");
    let bundle = pack_fixture(&dir);
    assert_eq!(fs::read(&bundle).unwrap()[0], 0);

    let output = msgbundle(&[
        "inspect",
        bundle.to_str().unwrap(),
        "--content",
        "parsed",
        "--records",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "inspect failed: {output:?}");

    let report = stdout_json(&output);
    assert_eq!(report["stream_id"], "sensors");
    assert_eq!(report["partition"], 2);
    assert_eq!(report["count"], 3);
    assert!(report.get("truncation").is_none());

    let records = report["records"].as_array().unwrap();
    let offsets: Vec<i64> = records.iter().map(|r| r["offset"].as_i64().unwrap()).collect();
    assert_eq!(offsets, vec![5, 2, 9]);
    assert_eq!(records[0]["content"], serde_json::json!({"n": 1}));
    assert_eq!(records[1]["previous_offset"], 1);
    assert_eq!(records[2]["ttl"], 60);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn inspect_reports_truncated_prefix() {
    let dir = unique_temp_dir("truncated");
    let bundle = pack_fixture(&dir);
    let mut bytes = fs::read(&bundle).unwrap();
    bytes.truncate(bytes.len() - 2);
    fs::write(&bundle, &bytes).unwrap();

    let output = msgbundle(&["inspect", bundle.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success(), "inspect failed: {output:?}");
    let report = stdout_json(&output);
    assert_eq!(report["count"], 2);
    assert_eq!(report["truncation"]["record_index"], 2);

    let strict = msgbundle(&[
        "inspect",
        bundle.to_str().unwrap(),
        "--format",
        "json",
        "--strict",
    ]);
    assert_eq!(strict.status.code(), Some(61));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn inspect_rejects_unknown_version() {
    let dir = unique_temp_dir("version");
    let bundle = dir.join("bad.bundle");
    fs::write(&bundle, [7u8, 0, 0, 0, 0]).unwrap();

    let output = msgbundle(&["inspect", bundle.to_str().unwrap(), "--format", "json"]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported bundle version 7"), "{stderr}");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn inspect_missing_file_is_not_found() {
    let dir = unique_temp_dir("missing");
    let output = msgbundle(&["inspect", dir.join("nope").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(51));
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn pack_rejects_malformed_line() {
    let dir = unique_temp_dir("malformed");
    let input = dir.join("bad.jsonl");
    fs::write(&input, "{\"offset\":1,\"timestamp\":1,\"content\":1}\nnot json\n").unwrap();

    let output = msgbundle(&[
        "pack",
        input.to_str().unwrap(),
        "--stream",
        "s",
        "--out",
        dir.join("out.bundle").to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "{stderr}");
    assert!(!dir.join("out.bundle").exists());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn pack_rejects_oversized_record() {
    let dir = unique_temp_dir("oversized");
    let input = dir.join("big.jsonl");
    fs::write(&input, "{\"offset\":1,\"timestamp\":1,\"content\":\"aaaaaaaaaa\"}\n").unwrap();

    let output = msgbundle(&[
        "pack",
        input.to_str().unwrap(),
        "--stream",
        "s",
        "--out",
        dir.join("out.bundle").to_str().unwrap(),
        "--max-record-size",
        "16",
    ]);
    assert_eq!(output.status.code(), Some(60));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn version_prints_package_version() {
    let output = msgbundle(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("msgbundle {}", env!("CARGO_PKG_VERSION"))
    );

    let extended = msgbundle(&["version", "--extended"]);
    let stdout = String::from_utf8_lossy(&extended.stdout);
    assert!(stdout.contains("bundle_format: 0"));
}
