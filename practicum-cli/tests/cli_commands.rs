use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const ROSTER: &str = "Student Name,Email,Username,Project Title,GitHub,Presentation,Report,Profile Page\n\
\"John Doe\",\"jdoe@worldclass.regis.edu\",\"jdoe001\",\"Data Analysis Project\",\"\",\"\",\"\",\"\"\n\
\"\",\"nobody@regis.edu\",\"\",\"\",\"\",\"\",\"\",\"\"\n";

fn practicum_cmd(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("practicum"));
    cmd.arg("--root").arg(root).env_remove("RUST_LOG");
    cmd
}

fn write_roster(root: &TempDir) -> PathBuf {
    let path = root.path().join("2025_Summer_MSDS692.csv");
    fs::write(&path, ROSTER).expect("write roster");
    path
}

#[test]
fn init_writes_config_once() {
    let root = TempDir::new().expect("root");
    practicum_cmd(root.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Wrote"));
    assert!(root.path().join("practicum.yaml").is_file());

    practicum_cmd(root.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("already exists"));
}

#[test]
fn dry_run_sync_reports_outcomes_and_writes_nothing() {
    let root = TempDir::new().expect("root");
    let csv = write_roster(&root);

    practicum_cmd(root.path())
        .arg("sync")
        .arg(&csv)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("1 created"))
        .stdout(contains("1 skipped"))
        .stdout(contains("jdoe001"));

    assert!(!root.path().join("data").exists(), "dry-run must not create folders");
    assert!(!root.path().join(".practicum").exists());
}

#[test]
fn sync_then_resync_is_unchanged() {
    let root = TempDir::new().expect("root");
    let csv = write_roster(&root);

    practicum_cmd(root.path())
        .arg("sync")
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("1 created"));
    let profile = root.path().join("data/students/jdoe001/profile.md");
    let first = fs::read_to_string(&profile).expect("profile");
    assert!(first.contains("email: jdoe@regis.edu"));

    practicum_cmd(root.path())
        .arg("sync")
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("0 created, 0 updated, 1 unchanged"));
    assert_eq!(fs::read_to_string(&profile).expect("profile"), first);
}

#[test]
fn sync_json_lists_each_outcome() {
    let root = TempDir::new().expect("root");
    let csv = write_roster(&root);

    let output = practicum_cmd(root.path())
        .args(["sync", "--json"])
        .arg(&csv)
        .output()
        .expect("run sync --json");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["course"], "MSDS 692");
    assert_eq!(json["semester"], "Summer 2025");
    assert_eq!(json["outcomes"][0]["outcome"], "created");
    assert_eq!(json["outcomes"][1]["outcome"], "skipped");
    assert_eq!(json["counts"]["skipped"], 1);
}

#[test]
fn unknown_course_fails_before_touching_disk() {
    let root = TempDir::new().expect("root");
    let csv = root.path().join("2025_Summer_MSDS999.csv");
    fs::write(&csv, ROSTER).expect("write roster");

    practicum_cmd(root.path())
        .arg("sync")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(contains("MSDS999"));
    assert!(!root.path().join("data").exists());
}

#[test]
fn diff_shows_title_change_after_roster_edit() {
    let root = TempDir::new().expect("root");
    let csv = write_roster(&root);
    practicum_cmd(root.path()).arg("sync").arg(&csv).assert().success();

    practicum_cmd(root.path())
        .arg("diff")
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("No differences"));

    fs::write(&csv, ROSTER.replace("Data Analysis Project", "Retail Forecasting"))
        .expect("rewrite roster");
    practicum_cmd(root.path())
        .arg("diff")
        .arg(&csv)
        .assert()
        .success()
        .stdout(contains("--- a/data/students/jdoe001/profile.md"))
        .stdout(contains("-**Title:** Data Analysis Project"))
        .stdout(contains("+**Title:** Retail Forecasting"));

    let profile = fs::read_to_string(root.path().join("data/students/jdoe001/profile.md"))
        .expect("profile");
    assert!(profile.contains("Data Analysis Project"), "diff must not write");
}

#[test]
fn status_json_reports_generated_sections() {
    let root = TempDir::new().expect("root");
    let csv = write_roster(&root);
    practicum_cmd(root.path()).arg("sync").arg(&csv).assert().success();

    let output = practicum_cmd(root.path())
        .args(["status", "--json"])
        .output()
        .expect("run status --json");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["summary"]["students"], 1);
    assert_eq!(json["summary"]["fully_generated"], 1);
    assert_eq!(json["students"][0]["username"], "jdoe001");
    assert_eq!(json["students"][0]["courses"][0], "MSDS692");
    assert_eq!(json["students"][0]["sections"][0]["provenance"], "generated");

    practicum_cmd(root.path())
        .arg("status")
        .assert()
        .success()
        .stdout(contains("1 students"))
        .stdout(contains("jdoe001"));
}

#[test]
fn render_publishes_pages_and_is_idempotent() {
    let root = TempDir::new().expect("root");
    let csv = write_roster(&root);
    practicum_cmd(root.path()).arg("sync").arg(&csv).assert().success();

    practicum_cmd(root.path())
        .arg("render")
        .assert()
        .success()
        .stdout(contains("1 pages, 1 course indexes (2 written)"));
    assert!(root.path().join("site/profiles/jdoe001.html").is_file());
    assert!(root.path().join("site/data/msds692.json").is_file());

    practicum_cmd(root.path())
        .arg("render")
        .assert()
        .success()
        .stdout(contains("(0 written)"));
}
