#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

const NETWORK: &str = "\
id,type,start,end
1,reservoir,,
2,junction,,
3,junction,,
4,tank,,
5,junction,,
10,pipe,1,2
11,valve,2,3
12,pump,1,3
";

fn setup(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(format!("{name}.csv"));
    fs::write(&path, contents).expect("write network csv");
    (dir, path)
}

fn json_output(args: &[&str], path: &PathBuf) -> Value {
    let output = cargo_bin_cmd!("netindex")
        .args(["--format", "json"])
        .args(args)
        .arg(path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("valid json")
}

#[test]
fn stats_reports_counts_and_sizes() {
    let (_dir, path) = setup("stats", NETWORK);
    let json = json_output(&["stats"], &path);
    assert_eq!(json["nodes"], 5);
    assert_eq!(json["links"], 3);
    assert_eq!(json["asset_index_bytes"], 13 * 4);
    assert_eq!(json["asset_type_bytes"], 8);
    assert!(json["total_bytes"].as_u64().unwrap() > 0);
}

#[test]
fn review_flags_isolated_and_unsupplied_nodes() {
    let (_dir, path) = setup("review", NETWORK);
    let json = json_output(&["review"], &path);
    assert_eq!(json["sources"], 2);
    assert_eq!(json["orphan_nodes"], serde_json::json!([4, 5]));
    assert_eq!(json["unsupplied_nodes"], serde_json::json!([5]));
}

#[test]
fn links_and_nodes_queries() {
    let (_dir, path) = setup("query", NETWORK);
    let output = cargo_bin_cmd!("netindex")
        .arg("links")
        .arg(&path)
        .arg("2")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(output).unwrap().trim(), "10 11");

    let output = cargo_bin_cmd!("netindex")
        .args(["--format", "json", "nodes"])
        .arg(&path)
        .arg("12")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("valid json");
    assert_eq!(json["start"], 1);
    assert_eq!(json["end"], 3);
}

#[test]
fn unknown_ids_and_bad_files_fail() {
    let (_dir, path) = setup("errors", NETWORK);
    cargo_bin_cmd!("netindex")
        .arg("nodes")
        .arg(&path)
        .arg("2")
        .assert()
        .failure();

    let (_dir, bad) = setup("bad", "id,type,start,end\n7,pipe,1,2\n");
    let output = cargo_bin_cmd!("netindex")
        .arg("stats")
        .arg(&bad)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();
    assert!(stderr.contains("line 2"), "stderr: {stderr}");
}

#[test]
fn endpoint_checks_cannot_be_disabled() {
    let (_dir, path) = setup("flags", NETWORK);
    cargo_bin_cmd!("netindex")
        .arg("--no-validate")
        .arg("stats")
        .arg(&path)
        .assert()
        .failure();
}
