//! Run the todoscan binary against temporary trees

use crate::common::TestTree;
use std::process::{Command, Output};

fn todoscan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_todoscan"))
        .args(["--log-level", "off", "--no-color"])
        .args(args)
        .output()
        .expect("run todoscan")
}

#[test]
fn test_json_output() {
    let tree = TestTree::with_files(&[
        ("src/a.rs", "// TODO(lee): first\n"),
        ("src/b.rs", "// FIXME second\n"),
    ]);

    let output = todoscan(&["--fetcher", "fs", "--format", "json", &tree.location()]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let report = &value[0];
    assert_eq!(report["location"], tree.location());
    assert_eq!(report["totalCount"], 2);
    assert_eq!(report["items"][0]["author"], "lee");
    assert_eq!(report["items"][1]["tag"], "FIXME");
}

#[test]
fn test_query_options_shape_output() {
    let tree = TestTree::with_files(&[
        ("a.rs", "// TODO alpha\n// FIXME beta\n// TODO gamma\n"),
    ]);

    let output = todoscan(&[
        "--fetcher",
        "fs",
        "--format",
        "csv",
        "--filter",
        "tag=todo",
        "--order-by",
        "text=desc",
        "--limit",
        "1",
        &tree.location(),
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains(",gamma,"));
}

#[test]
fn test_config_file_supplies_options() {
    let tree = TestTree::with_files(&[("a.rs", "// HACK: config tag\n// TODO default tag\n")]);
    let config_dir = TestTree::with_files(&[(
        "todoscan.toml",
        "tag = \"HACK\"\nformat = \"json\"\nfetcher = \"fs\"\n",
    )]);
    let config = config_dir.path().join("todoscan.toml");

    let output = todoscan(&["-c", &config.to_string_lossy(), &tree.location()]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["totalCount"], 1);
    assert_eq!(value[0]["items"][0]["tag"], "HACK");
}

#[test]
fn test_failed_location_sets_exit_code() {
    let tree = TestTree::with_files(&[("a.rs", "// TODO ok\n")]);
    let missing = tree.path().join("missing").to_string_lossy().to_string();

    let output = todoscan(&["--fetcher", "fs", "--format", "json", &tree.location(), &missing]);
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_config_file_is_error() {
    let output = todoscan(&["-c", "/definitely/not/here/todoscan.toml"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
}
