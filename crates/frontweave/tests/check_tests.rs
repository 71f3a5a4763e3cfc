//! Integration tests for `frontweave check`

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo_bin;
use frontweave_testkit::{hierarchy_schema, temp_dir_in_workspace, write_document, write_file};
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

fn frontweave(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("frontweave"));
    cmd.current_dir(dir);
    cmd
}

#[test]
fn test_check_valid_bindings() {
    let temp = temp_dir_in_workspace();
    let root = temp.path();
    write_file(root, "index.json", r#"{"shelf": "{shelf}", "books": ["{@items}"]}"#);
    write_file(root, "schema.json", &hierarchy_schema("books"));
    write_document(root, "index.md", "shelf: Classics\n", "");
    write_document(root, "a.md", "title: Alpha\n", "");

    frontweave(root)
        .args(["check", "index.json", "--schema", "schema.json", "--main", "index.md", "a.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hierarchy root: books"))
        .stdout(predicate::str::contains("Bindings valid"));
}

#[test]
fn test_check_reports_unresolved_tokens_as_json() {
    let temp = temp_dir_in_workspace();
    let root = temp.path();
    write_file(root, "index.json", r#"{"shelf": "{shelf}", "owner": "{owner}"}"#);
    write_file(root, "schema.json", &hierarchy_schema("books"));

    let output = frontweave(root)
        .args(["check", "index.json", "--schema", "schema.json", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total_tokens"], 2);
    assert_eq!(report["invalid_tokens"], 2);
    assert_eq!(report["hierarchy_root"], "books");
    assert_eq!(report["uses_items"], false);
}

#[test]
fn test_check_ambiguous_schema_fails() {
    let temp = temp_dir_in_workspace();
    let root = temp.path();
    write_file(root, "index.json", r#"{"books": ["{@items}"]}"#);
    write_file(
        root,
        "schema.json",
        r#"{"properties": {"a": {"x-frontmatter-part": true}, "b": {"x-frontmatter-part": true}}}"#,
    );

    frontweave(root)
        .args(["check", "index.json", "--schema", "schema.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("AMBIGUOUS_HIERARCHY_ROOT"));
}
