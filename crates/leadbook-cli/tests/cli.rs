use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    db_path: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db_path = dir.path().join("leadbook.sqlite3");
        Self { dir, db_path }
    }

    fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write file");
        path
    }

    fn output(&self, json: bool, args: &[&str]) -> std::process::Output {
        let mut cmd = cargo_bin_cmd!("leadbook");
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("RUST_LOG")
            .args(["--db-path", path_str(&self.db_path)]);
        if json {
            cmd.arg("--json");
        }
        cmd.args(args).output().expect("run command")
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self.output(false, args);
        assert!(output.status.success(), "command failed: {:?}", output);
        String::from_utf8(output.stdout).expect("utf8")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self.output(true, args);
        assert!(output.status.success(), "command failed: {:?}", output);
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("parse json");
        assert_eq!(envelope["success"], true);
        envelope["data"].clone()
    }

    fn add_lead(&self, name: &str, email: &str) -> String {
        let lead = self.run_json(&["add-lead", "--name", name, "--email", email]);
        lead["id"].as_str().expect("id").to_string()
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

#[test]
fn lead_lifecycle_records_field_changes() {
    let ws = Workspace::new();
    let id = ws.add_lead("Ada Lovelace", "Ada@Example.com");

    let list = ws.run_json(&["list"]);
    let items = list.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["email"], "ada@example.com");
    assert_eq!(items[0]["stage"], "new");

    ws.run(&["edit-lead", &id, "--stage", "qualified", "--author", "sam"]);

    let detail = ws.run_json(&["show", &id]);
    assert_eq!(detail["stage"], "qualified");
    assert_eq!(detail["source"], "manual");
    let activity = detail["recent_activity"].as_array().expect("activity");
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0]["kind"], "field_update");
    assert_eq!(activity[0]["content"], "stage: new -> qualified");

    ws.run(&["delete", &id]);
    let output = ws.output(false, &["show", &id]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn duplicate_email_is_invalid_input_with_failure_envelope() {
    let ws = Workspace::new();
    ws.add_lead("Ada", "ada@example.com");

    let output = ws.output(
        true,
        &["add-lead", "--name", "Other", "--email", "ADA@example.com"],
    );
    assert_eq!(output.status.code(), Some(3));
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(envelope["success"], false);
    assert!(envelope["message"]
        .as_str()
        .expect("message")
        .contains("duplicate email"));
    assert!(envelope.get("data").is_none());
}

#[test]
fn timeline_merges_notes_calls_and_messages() {
    let ws = Workspace::new();
    let id = ws.add_lead("Ada", "ada@example.com");

    ws.run(&["add-note", &id, "--body", "Met at the fair"]);
    ws.run(&[
        "log-call",
        &id,
        "--outcome",
        "answered",
        "--duration-secs",
        "200",
        "--at",
        "2020-01-02 10:00",
        "--summary",
        "wants a demo",
    ]);
    ws.run(&[
        "log-message",
        &id,
        "--channel",
        "whatsapp",
        "--body",
        "brochure sent",
        "--at",
        "2020-01-01 09:00",
    ]);

    let timeline = ws.run_json(&["timeline", &id]);
    let entries = timeline.as_array().expect("array");
    let sources: Vec<_> = entries
        .iter()
        .map(|entry| entry["source"].as_str().expect("source"))
        .collect();
    assert_eq!(sources, vec!["note", "call", "activity"]);
    assert_eq!(entries[1]["content"], "answered call, 3m 20s: wants a demo");

    let limited = ws.run_json(&["timeline", &id, "--limit", "1"]);
    assert_eq!(limited.as_array().expect("array").len(), 1);
}

#[test]
fn tasks_and_custom_fields() {
    let ws = Workspace::new();
    let id = ws.add_lead("Ada", "ada@example.com");

    ws.run(&["field", "add", "Budget Range"]);
    let fields = ws.run_json(&["field", "ls"]);
    assert_eq!(fields[0]["key"], "budget_range");
    ws.run(&["field", "set", &id, "budget_range", "10k"]);

    let task = ws.run_json(&["task", "add", &id, "--title", "Send pricing", "--due", "2099-01-01"]);
    let task_id = task["id"].as_str().expect("task id").to_string();
    assert_eq!(ws.run_json(&["task", "ls", &id]).as_array().expect("array").len(), 1);

    ws.run(&["task", "done", &task_id]);
    assert!(ws.run_json(&["task", "ls", &id]).as_array().expect("array").is_empty());
    assert_eq!(ws.run_json(&["task", "ls", &id, "--all"]).as_array().expect("array").len(), 1);

    let detail = ws.run_json(&["show", &id]);
    assert_eq!(detail["custom_fields"]["budget_range"], "10k");
    let kinds: Vec<_> = detail["recent_activity"]
        .as_array()
        .expect("activity")
        .iter()
        .map(|entry| entry["kind"].as_str().expect("kind").to_string())
        .collect();
    assert!(kinds.contains(&"task_created".to_string()));
    assert!(kinds.contains(&"task_completed".to_string()));

    let output = ws.output(false, &["field", "set", &id, "region", "emea"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn import_preview_and_run() {
    let ws = Workspace::new();
    ws.add_lead("Existing", "taken@example.com");
    ws.run(&["field", "add", "Budget"]);
    let csv = ws.write_file(
        "leads.csv",
        "full_name,email,phone,Budget,Lead Stage\n\
         Ada,ada@example.com,+1 555 0101,10k,qualified\n\
         Grace,grace@example.com,,,\n\
         Taken,TAKEN@example.com,,,\n\
         ,missing@example.com,,,\n",
    );

    let preview = ws.run_json(&["import", "preview", path_str(&csv)]);
    assert_eq!(preview["rows"], 4);
    assert_eq!(preview["ready"], true);
    let entries = preview["mapping"]["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["target"]["target"], "name");
    assert_eq!(entries[3]["target"]["kind"], "custom");

    let dry = ws.run_json(&["import", "run", path_str(&csv), "--dry-run"]);
    assert_eq!(dry["dry_run"], true);
    assert_eq!(dry["created"], 2);
    assert_eq!(ws.run_json(&["list"]).as_array().expect("array").len(), 1);

    let result = ws.run_json(&["import", "run", path_str(&csv)]);
    assert_eq!(result["total"], 4);
    assert_eq!(result["created"], 2);
    assert_eq!(result["skipped_duplicate"], 1);
    assert_eq!(result["failed"], 1);
    assert_eq!(result["issues"][0]["row"], 3);
    assert_eq!(result["issues"][0]["kind"], "duplicate");
    assert_eq!(result["issues"][1]["kind"], "validation");

    let leads = ws.run_json(&["list", "--search", "ada"]);
    let ada_id = leads[0]["id"].as_str().expect("id").to_string();
    assert_eq!(leads[0]["stage"], "qualified");
    let detail = ws.run_json(&["show", &ada_id]);
    assert_eq!(detail["source"], "import");
    assert_eq!(detail["custom_fields"]["budget"], "10k");

    let again = ws.run_json(&["import", "run", path_str(&csv), "--duplicates", "update"]);
    assert_eq!(again["updated"], 3);
    assert_eq!(again["created"], 0);
}

#[test]
fn import_blocked_without_email_column() {
    let ws = Workspace::new();
    let csv = ws.write_file("leads.csv", "full_name,phone\nAda,555\n");

    let output = ws.output(true, &["import", "run", path_str(&csv)]);
    assert_eq!(output.status.code(), Some(3));
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert!(envelope["message"]
        .as_str()
        .expect("message")
        .contains("missing required fields: email"));

    let mapped = ws.output(true, &["import", "run", path_str(&csv), "--map", "phone=email"]);
    assert_eq!(mapped.status.code(), Some(3));
    let envelope: Value = serde_json::from_slice(&mapped.stdout).expect("parse json");
    assert!(envelope["message"]
        .as_str()
        .expect("message")
        .contains("import aborted: 1 of 1 rows are invalid"));

    let unknown = ws.output(false, &["import", "run", path_str(&csv), "--map", "fax=email"]);
    assert_eq!(unknown.status.code(), Some(3));
}

#[test]
fn import_rejects_undefined_custom_target() {
    let ws = Workspace::new();
    ws.run(&["field", "add", "Budget"]);
    let csv = ws.write_file(
        "leads.csv",
        "name,email,Region\nAda,ada@example.com,EU\nBob,bob@example.com,US\n",
    );

    let output = ws.output(
        true,
        &["import", "run", path_str(&csv), "--map", "Region=custom:nope"],
    );
    assert_eq!(output.status.code(), Some(3));
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(envelope["success"], false);
    assert!(envelope["message"]
        .as_str()
        .expect("message")
        .contains("custom:nope is not a defined custom field"));
    assert_eq!(ws.run_json(&["list"]).as_array().expect("array").len(), 0);

    let result = ws.run_json(&["import", "run", path_str(&csv), "--map", "Region=custom:budget"]);
    assert_eq!(result["created"], 2);
    assert_eq!(result["failed"], 0);
}

#[test]
fn import_rejects_unsupported_file() {
    let ws = Workspace::new();
    let file = ws.write_file("leads.pdf", "not a spreadsheet");
    let output = ws.output(true, &["import", "preview", path_str(&file)]);
    assert_eq!(output.status.code(), Some(3));
    let envelope: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert!(envelope["message"]
        .as_str()
        .expect("message")
        .contains("unsupported file format"));
}

#[test]
fn completions_do_not_touch_the_database() {
    let ws = Workspace::new();
    let output = ws.run(&["completions", "bash"]);
    assert!(output.contains("leadbook"));
    assert!(!ws.db_path.exists());
}
