//! End-to-end tests for the `allot` binary against a scratch data directory.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("allot-cli-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("allot").unwrap();
        cmd.env("ALLOT_DATA_DIR", &self.dir)
            .env("ALLOT_CONFIG", self.dir.join("config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) {
        self.cmd().args(args).assert().success();
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().arg("--output").arg("json").args(args).output().unwrap();
        assert!(output.status.success(), "{:?} failed: {}", args, String::from_utf8_lossy(&output.stderr));
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Two allocators and two targets; a full run funds both targets.
    fn seeded() -> Self {
        let ws = Self::new();
        ws.run(&["allocator", "add", "Ana", "1000"]);
        ws.run(&["allocator", "add", "Bia", "500"]);
        ws.run(&["allocator", "intentions", "1", "--set", "health=600"]);
        ws.run(&["target", "add", "Clinic", "800", "--category", "Health"]);
        ws.run(&["target", "add", "Road", "400", "--category", "roads"]);
        ws
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[test]
fn add_allocator_reports_id() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["allocator", "add", "Ana", "1000", "--profile", "fiscal hawk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Allocator 'Ana' added with ID 1"));

    let list = ws.json(&["allocator", "list"]);
    assert_eq!(list[0]["name"], "Ana");
    assert_eq!(list[0]["pending"], "yes");
}

#[test]
fn negative_budget_is_rejected() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["allocator", "add", "Ana", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid amount"));
}

#[test]
fn preferences_over_limit_fail() {
    let ws = Workspace::seeded();
    ws.cmd()
        .args(["allocator", "preferences", "2", "--set", "Health=6", "--set", "Roads=5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds limit 10"));
}

#[test]
fn malformed_assignment_is_a_usage_error() {
    let ws = Workspace::seeded();
    ws.cmd()
        .args(["allocator", "intentions", "1", "--set", "Health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CATEGORY=VALUE"));
}

#[test]
fn categories_are_registered_from_targets() {
    let ws = Workspace::seeded();
    let categories = ws.json(&["category", "list"]);
    let names: Vec<&str> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Health", "Roads"]);

    ws.cmd()
        .args(["category", "add", "HEALTH"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn category_in_use_cannot_be_deleted() {
    let ws = Workspace::seeded();
    ws.cmd()
        .args(["category", "delete", "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("category Health is in use"));

    let categories = ws.json(&["category", "list"]);
    assert_eq!(categories[0]["in_use"], "yes");

    ws.run(&["category", "add", "water"]);
    ws.cmd()
        .args(["category", "delete", "water"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Category 'Water' deleted"));
}

#[test]
fn unknown_allocator_is_not_found() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["allocator", "show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("allocator 42"));
}

// ---------------------------------------------------------------------------
// Redistribution
// ---------------------------------------------------------------------------

#[test]
fn full_run_funds_targets_and_passes_check() {
    let ws = Workspace::seeded();
    ws.cmd()
        .args(["redistribute", "full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Full redistribution completed for 2 allocator(s)."));

    let report = ws.json(&["report"]);
    assert_eq!(report["summary"]["funded"], 2);
    assert_eq!(report["summary"]["unfunded"], 0);
    assert_eq!(report["summary"]["total_spent"], 1200.0);
    assert_eq!(report["summary"]["percentage_used"], 80.0);

    ws.cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ledger consistent"));

    let pending = ws.json(&["allocator", "list", "--pending"]);
    assert!(pending.as_array().unwrap().is_empty());
}

#[test]
fn partial_run_reports_unknown_ids() {
    let ws = Workspace::seeded();
    ws.run(&["redistribute", "full"]);

    let status = ws.json(&["redistribute", "partial", "2", "99"]);
    assert_eq!(status["status"], "completed");
    assert_eq!(status["allocators_processed"], 1);
    assert_eq!(status["unknown_ids"][0], 99);
}

#[test]
fn pending_run_with_clean_state_does_nothing() {
    let ws = Workspace::seeded();
    ws.run(&["redistribute", "full"]);
    ws.cmd()
        .args(["redistribute", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No allocators selected for partial redistribution.",
        ));
}

#[test]
fn budget_update_marks_allocator_pending() {
    let ws = Workspace::seeded();
    ws.run(&["redistribute", "full"]);
    ws.run(&["allocator", "update", "2", "--budget", "100"]);

    let pending = ws.json(&["allocator", "list", "--pending"]);
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["id"], 2);

    let status = ws.json(&["redistribute", "pending"]);
    assert_eq!(status["allocators_processed"], 1);
    ws.run(&["check"]);
}

// ---------------------------------------------------------------------------
// Reports and checks
// ---------------------------------------------------------------------------

#[test]
fn text_report_has_sections() {
    let ws = Workspace::seeded();
    ws.run(&["redistribute", "full"]);
    ws.cmd()
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Allocators"))
        .stdout(predicate::str::contains("--- Funded ---"))
        .stdout(predicate::str::contains("1,000.00"));
}

#[test]
fn chart_is_structured() {
    let ws = Workspace::seeded();
    ws.run(&["redistribute", "full"]);
    let chart = ws.json(&["report", "chart"]);
    assert_eq!(chart["type"], "pie");
    assert_eq!(chart["series"][0]["data"], 1200.0);
    assert_eq!(chart["series"][1]["data"], 300.0);
}

#[test]
fn allocator_show_has_contributions_and_charts() {
    let ws = Workspace::seeded();
    ws.run(&["redistribute", "full"]);

    let detail = ws.json(&["allocator", "show", "1"]);
    assert_eq!(detail["section"]["name"], "Ana");
    assert_eq!(detail["section"]["contributions"][0]["category"], "Health");
    assert_eq!(detail["charts"]["intentions"]["series"][0]["data"], 600.0);
    assert!(detail["charts"].get("preferences").is_none());
    assert!(detail["charts"].get("contributions").is_some());

    ws.cmd()
        .args(["allocator", "show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bia (ID: 2)"))
        .stdout(predicate::str::contains("Contributed budget per category"));
}

#[test]
fn check_fails_on_tampered_ledger() {
    let ws = Workspace::seeded();
    ws.run(&["redistribute", "full"]);

    let path = ws.dir.join("targets.json");
    let mut targets: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    targets[0]["funded_amount"] = serde_json::json!(1.0);
    fs::write(&path, serde_json::to_string_pretty(&targets).unwrap()).unwrap();

    ws.cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("differs from ledger total"));
}

#[test]
fn corrupt_store_file_is_reported() {
    let ws = Workspace::new();
    fs::write(ws.dir.join("allocators.json"), "{ not json").unwrap();
    ws.cmd()
        .args(["allocator", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt store file"));
}

#[test]
fn config_sets_default_output() {
    let ws = Workspace::new();
    fs::write(ws.dir.join("config.toml"), "default_output = \"json\"\n").unwrap();
    ws.run(&["category", "add", "water"]);

    let output = ws.cmd().args(["category", "list"]).output().unwrap();
    let list: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(list[0]["name"], "Water");
    assert_eq!(list[0]["targets"], 0);
}
