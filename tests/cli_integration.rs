//! Integration tests for the `tick` CLI.
//!
//! Each test works on a checklist file in a temp directory, runs `tick` as a
//! subprocess, and checks stdout and/or the saved file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Get the path to the built `tick` binary.
fn tick_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tick");
    path
}

fn command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(tick_bin());
    cmd.arg("-f")
        .arg(dir.join("list.json"))
        .args(args)
        .env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("TICK_FILE")
        .env_remove("TICK_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    command(dir, args).output().unwrap()
}

fn run_with_stdin(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = command(dir, args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

/// Run and expect success; returns stdout
fn ok(dir: &Path, args: &[&str]) -> String {
    let out = run(dir, args);
    assert!(
        out.status.success(),
        "tick {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap()
}

fn list(dir: &Path) -> String {
    ok(dir, &["list"])
}

/// bread (1), milk (2), eggs (3)
fn groceries() -> TempDir {
    let dir = TempDir::new().unwrap();
    ok(dir.path(), &["edit", "1", "bread"]);
    assert_eq!(ok(dir.path(), &["add", "milk"]), "2\n");
    assert_eq!(ok(dir.path(), &["add", "eggs"]), "3\n");
    dir
}

#[test]
fn fresh_list_has_one_blank_item() {
    let dir = TempDir::new().unwrap();
    assert_eq!(list(dir.path()), "[ ] 1  \n");
    assert!(!dir.path().join("list.json").exists());
}

#[test]
fn add_edit_and_list() {
    let dir = groceries();
    assert_eq!(list(dir.path()), "[ ] 1  bread\n[ ] 2  milk\n[ ] 3  eggs\n");
}

#[test]
fn add_after_inserts_in_place() {
    let dir = groceries();
    assert_eq!(ok(dir.path(), &["add", "butter", "--after", "1"]), "4\n");
    assert_eq!(
        list(dir.path()),
        "[ ] 1  bread\n[ ] 4  butter\n[ ] 2  milk\n[ ] 3  eggs\n"
    );
}

#[test]
fn checked_items_move_to_the_bottom() {
    let dir = groceries();
    ok(dir.path(), &["check", "1"]);
    ok(dir.path(), &["check", "3"]);
    assert_eq!(list(dir.path()), "[ ] 2  milk\n[x] 1  bread\n[x] 3  eggs\n");

    ok(dir.path(), &["uncheck", "1"]);
    assert_eq!(list(dir.path()), "[ ] 1  bread\n[ ] 2  milk\n[x] 3  eggs\n");
}

#[test]
fn mv_moves_a_block() {
    let dir = groceries();
    ok(dir.path(), &["mv", "2", "3", "--to", "0"]);
    assert_eq!(list(dir.path()), "[ ] 2  milk\n[ ] 3  eggs\n[ ] 1  bread\n");
}

#[test]
fn mv_reactivates_checked_items() {
    let dir = groceries();
    ok(dir.path(), &["check", "3"]);
    ok(dir.path(), &["mv", "3", "--to", "0"]);
    assert_eq!(list(dir.path()), "[ ] 3  eggs\n[ ] 1  bread\n[ ] 2  milk\n");
}

#[test]
fn mv_needs_edit_mode() {
    let dir = groceries();
    ok(dir.path(), &["edit-mode", "off"]);
    let out = run(dir.path(), &["mv", "3", "--to", "0"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("edit mode"));
    assert_eq!(list(dir.path()), "[ ] 1  bread\n[ ] 2  milk\n[ ] 3  eggs\n");
}

#[test]
fn rm_needs_edit_mode() {
    let dir = groceries();
    ok(dir.path(), &["edit-mode", "off"]);
    let out = run(dir.path(), &["rm", "2"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("edit mode"));

    ok(dir.path(), &["edit-mode", "on"]);
    ok(dir.path(), &["rm", "2"]);
    assert_eq!(list(dir.path()), "[ ] 1  bread\n[ ] 3  eggs\n");
}

#[test]
fn paste_splits_lines_into_items() {
    let dir = groceries();
    let out = run_with_stdin(dir.path(), &["paste", "1", "--cursor", "0"], "rye \njam\n\ntea\n");
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "5\n");
    assert_eq!(
        list(dir.path()),
        "[ ] 1  rye bread\n[ ] 4  jam\n[ ] 5  tea\n[ ] 2  milk\n[ ] 3  eggs\n"
    );
}

#[test]
fn single_line_paste_appends_at_end() {
    let dir = groceries();
    let out = run_with_stdin(dir.path(), &["paste", "2"], " (oat)\n");
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "");
    assert!(list(dir.path()).contains("[ ] 2  milk (oat)\n"));
}

#[test]
fn reset_requires_confirmation() {
    let dir = groceries();
    let out = run(dir.path(), &["reset"]);
    assert!(!out.status.success());
    assert!(list(dir.path()).contains("bread"));

    ok(dir.path(), &["reset", "--yes"]);
    assert_eq!(list(dir.path()), "[ ] 1  \n");
}

#[test]
fn unknown_id_is_an_error() {
    let dir = groceries();
    let out = run(dir.path(), &["check", "42"]);
    assert!(!out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stderr).trim(),
        "error: no item with id 42"
    );
}

#[test]
fn json_output() {
    let dir = groceries();
    ok(dir.path(), &["check", "1"]);
    let out = ok(dir.path(), &["list", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["edit"], true);
    let ids: Vec<u64> = value["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3, 1]);
    assert!(value["items"][2]["checkedAt"].is_string());

    let out = ok(dir.path(), &["add", "tea", "--json"]);
    assert_eq!(out.trim(), r#"{"id":4}"#);
}

#[test]
fn saved_file_is_plain_json() {
    let dir = groceries();
    let text = fs::read_to_string(dir.path().join("list.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["items"][1]["text"], "milk");
    assert!(value["items"][1].get("selected").is_none());
}

#[test]
fn malformed_file_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.json");
    fs::write(&path, "{ broken").unwrap();
    let out = run(dir.path(), &["add", "milk"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("malformed"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
}

#[test]
fn malformed_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config/tick/config.toml");
    fs::create_dir_all(config.parent().unwrap()).unwrap();
    fs::write(&config, "[history\n").unwrap();
    let out = run(dir.path(), &["list"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("config.toml"));
}
