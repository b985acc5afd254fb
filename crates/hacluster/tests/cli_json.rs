use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn hacluster_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_hacluster"))
}

fn run_cli(args: &[&str], home: &Path) -> Output {
    Command::new(hacluster_bin())
        .args(args)
        .env("HACLUSTER_HOME", home)
        .env_remove("HACLUSTER_CONFIG")
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to execute hacluster CLI")
}

fn parse_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "failed to parse JSON output: {}\nstdout:\n{}\nstderr:\n{}",
            err,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn run_ok(args: &[&str], home: &Path) -> Output {
    let output = run_cli(args, home);
    assert!(
        output.status.success(),
        "command failed: {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn test_init_then_check() {
    let home = TempDir::new().unwrap();
    run_ok(&["init"], home.path());
    assert!(home.path().join("cluster.toml").exists());

    let report = parse_json(&run_ok(&["check", "--json"], home.path()));
    assert_eq!(report["cluster"]["cluster_name"], "default");
    assert_eq!(report["cluster"]["balancer"], "round-robin");
    assert_eq!(report["cluster"]["replicas"].as_array().unwrap().len(), 2);
    assert_eq!(report["registered_clusters"], serde_json::json!(["default"]));
    assert!(report["next_reactivation"].is_string());
}

#[test]
fn test_check_unknown_balancer_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    fs::write(
        &config,
        r#"
balancer = "nonexistent"

[[replicas]]
name = "r1"
location = "postgres://db1/app"
"#,
    )
    .unwrap();

    let output = run_cli(
        &["check", "--json", "--config", config.to_str().unwrap()],
        home.path(),
    );
    assert!(!output.status.success());
    let err = parse_json(&output);
    assert!(err["error"].as_str().unwrap().contains("nonexistent"));
}

#[test]
fn test_check_missing_config_fails() {
    let home = TempDir::new().unwrap();
    let output = run_cli(&["check"], home.path());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Cluster config not found"));
}

#[test]
fn test_strategies_json() {
    let home = TempDir::new().unwrap();
    let entries = parse_json(&run_ok(
        &["strategies", "--kind", "state-persistence", "--json"],
        home.path(),
    ));
    let ids: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["simple", "berkeleydb", "sqlite", "sql"]);
}

#[test]
fn test_schedule_json() {
    let home = TempDir::new().unwrap();
    let output = parse_json(&run_ok(
        &["schedule", "--expr", "0 0/1 * 1/1 * ? *", "-n", "3", "--json"],
        home.path(),
    ));
    assert_eq!(output["upcoming"].as_array().unwrap().len(), 3);
}

#[test]
fn test_schedule_last_day_of_month_json() {
    let home = TempDir::new().unwrap();
    let output = parse_json(&run_ok(
        &["schedule", "--expr", "0 15 10 L * ?", "-n", "2", "--json"],
        home.path(),
    ));
    let upcoming = output["upcoming"].as_array().unwrap();
    assert_eq!(upcoming.len(), 2);
    for instant in upcoming {
        assert!(instant.as_str().unwrap().contains("T10:15:00"));
    }
}

#[test]
fn test_schedule_never_firing_is_empty() {
    let home = TempDir::new().unwrap();
    let output = parse_json(&run_ok(
        &["schedule", "--expr", "0 0 0 30 2 ?", "--json"],
        home.path(),
    ));
    assert!(output["upcoming"].as_array().unwrap().is_empty());
}

#[test]
fn test_item_crud() {
    let home = TempDir::new().unwrap();
    let created = parse_json(&run_ok(
        &["item", "add", "orders", "--description", "nightly", "--json"],
        home.path(),
    ));
    let id = created["id"].as_i64().unwrap().to_string();

    let fetched = parse_json(&run_ok(&["item", "get", &id, "--json"], home.path()));
    assert_eq!(fetched["name"], "orders");

    run_ok(&["item", "delete", &id], home.path());
    let listed = parse_json(&run_ok(&["item", "list", "--json"], home.path()));
    assert!(listed.as_array().unwrap().is_empty());

    let output = run_cli(&["item", "delete", &id], home.path());
    assert!(!output.status.success());
}
