use assert_cmd::prelude::*;
use std::process::Command;

fn bin() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("pod-restarter"))
}

fn dev_run(extra: &[&str]) -> Vec<serde_json::Value> {
    let mut cmd = bin();

    let assert = cmd
        .env("RUST_LOG", "info")
        .args([
            "--dev",
            "-n",
            "shop",
            "--cycles",
            "1",
            "--grace-seconds",
            "0",
            "--polling-interval",
            "1",
            "--log-format",
            "json",
        ])
        .args(extra)
        .assert()
        .success();

    let err = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    err.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).expect("each log line must be valid JSON"))
        .collect()
}

fn outcome_of<'a>(lines: &'a [serde_json::Value], pod: &str) -> Vec<&'a str> {
    lines
        .iter()
        .filter(|v| v.get("pod").and_then(|p| p.as_str()) == Some(pod))
        .filter_map(|v| v.get("outcome").and_then(|o| o.as_str()))
        .collect()
}

#[test]
fn dev_cycle_logs_every_decision() {
    let lines = dev_run(&[]);

    assert_eq!(outcome_of(&lines, "web-5f7c9-x2k4p"), ["selected", "deleted"]);
    assert_eq!(outcome_of(&lines, "debug-shell"), ["selected", "skipped-no-owner"]);
    assert_eq!(outcome_of(&lines, "api-6b8d4-q9m2z"), ["selected", "state-changed"]);
    assert_eq!(outcome_of(&lines, "batch-28461-7xk2l"), ["selected", "vanished"]);
    assert!(outcome_of(&lines, "cache-0").is_empty());
    assert!(outcome_of(&lines, "worker-9c7d2-r5t8w").is_empty());

    let skipped = lines
        .iter()
        .find(|v| v["outcome"] == "skipped-no-owner")
        .expect("skip is logged");
    assert!(skipped.get("owners").is_some());

    // Every Pending pod is reported, matched or not.
    assert!(lines
        .iter()
        .any(|v| v["pod"] == "cache-0" && v["level"] == "INFO"));

    let summary = lines
        .iter()
        .find(|v| v.get("matched").is_some())
        .expect("cycle logs a match summary");
    assert_eq!(summary["matched"], 4);
    assert_eq!(summary["pending"], 5);
}

#[test]
fn dev_dry_run_deletes_nothing() {
    let lines = dev_run(&["--dry-run"]);

    assert_eq!(outcome_of(&lines, "web-5f7c9-x2k4p"), ["selected", "would-delete"]);
    assert!(lines
        .iter()
        .all(|v| v.get("outcome").and_then(|o| o.as_str()) != Some("deleted")));
}

#[test]
fn empty_error_message_is_rejected() {
    bin()
        .env("RUST_LOG", "off")
        .args(["--dev", "--error-message", ""])
        .assert()
        .failure();
}

#[test]
fn unreadable_kubeconfig_exits_nonzero() {
    bin()
        .env("RUST_LOG", "off")
        .env_remove("KUBERNETES_SERVICE_HOST")
        .env_remove("KUBERNETES_SERVICE_PORT")
        .args(["--kubeconfig", "/nonexistent/pod-restarter/config", "--cycles", "1"])
        .assert()
        .failure();
}
