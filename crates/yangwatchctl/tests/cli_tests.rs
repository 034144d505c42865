//! CLI integration tests for yangwatchctl
//!
//! Tests the CLI surface:
//! - yangwatchctl run        inventory overrides, worker bounds, repeated --check
//! - yangwatchctl evaluate   offline evaluation of persisted documents
//! - yangwatchctl checks     check listing
//!
//! `run` is driven end to end against an unreachable device; healthy devices
//! are covered by the shared crate's transport and runner tests.

use clap::Parser;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use yangwatch_shared::evaluator::{DomainCheckPolicy, ZeroCounterPolicy};
use yangwatch_shared::inventory::Inventory;
use yangwatchctl::cli::{Cli, Commands, EvaluateArgs, RunArgs};
use yangwatchctl::commands::{apply_overrides, handle_checks, handle_evaluate, handle_run};
use yangwatchctl::errors::{EXIT_CHECKS_FAILED, EXIT_SUCCESS};
use yangwatchctl::VERSION;

const INVENTORY: &str = r#"
[settings]
output_dir = "snapshots"
workers = 2

[[devices]]
alias = "csr1"
base_url = "https://192.0.2.10"
username = "admin"
password = "admin"
"#;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("arguments parse")
}

fn run_args(args: &[&str]) -> RunArgs {
    let mut full = vec!["yangwatchctl", "run"];
    full.extend_from_slice(args);
    match parse(&full).command {
        Commands::Run(run) => run,
        other => panic!("expected run, got {:?}", other),
    }
}

fn evaluate_args(args: &[&str]) -> EvaluateArgs {
    let mut full = vec!["yangwatchctl", "evaluate"];
    full.extend_from_slice(args);
    match parse(&full).command {
        Commands::Evaluate(evaluate) => evaluate,
        other => panic!("expected evaluate, got {:?}", other),
    }
}

fn write_json(dir: &TempDir, name: &str, value: serde_json::Value) -> String {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path.display().to_string()
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_run_defaults() {
    let run = run_args(&[]);
    assert_eq!(run.inventory, PathBuf::from("yangwatch.toml"));
    assert!(run.output_dir.is_none());
    assert!(run.workers.is_none());
    assert!(run.checks.is_empty());
    assert!(!run.legacy);
    assert!(!run.json);
}

#[test]
fn test_run_repeated_check_flag() {
    let run = run_args(&[
        "--inventory",
        "lab.toml",
        "--check",
        "system_motd",
        "--check",
        "interface_full_duplex",
        "--workers",
        "8",
    ]);
    assert_eq!(run.inventory, PathBuf::from("lab.toml"));
    assert_eq!(run.checks, vec!["system_motd", "interface_full_duplex"]);
    assert_eq!(run.workers, Some(8));
}

#[test]
fn test_run_rejects_zero_workers() {
    assert!(Cli::try_parse_from(["yangwatchctl", "run", "--workers", "0"]).is_err());
}

#[test]
fn test_evaluate_needs_a_document() {
    assert!(Cli::try_parse_from(["yangwatchctl", "evaluate"]).is_err());
    let args = evaluate_args(&["--system", "sys.json"]);
    assert!(args.interfaces.is_none());
    assert_eq!(args.device, "local");
}

#[test]
fn test_version_comes_from_build_script() {
    let err = Cli::try_parse_from(["yangwatchctl", "--version"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    assert!(err.to_string().contains(VERSION));
    assert!(!VERSION.is_empty());
}

#[test]
fn test_verbose_is_global() {
    let cli = parse(&["yangwatchctl", "checks", "-vv"]);
    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Commands::Checks { json: false }));
}

// ============================================================================
// Inventory overrides
// ============================================================================

#[test]
fn test_overrides_replace_inventory_settings() {
    let mut inventory = Inventory::from_toml_str(INVENTORY, "inline").unwrap();
    let args = run_args(&[
        "--output-dir",
        "/tmp/out",
        "--workers",
        "5",
        "--check",
        "system_domain_name",
        "--legacy",
    ]);

    apply_overrides(&mut inventory, &args).unwrap();

    assert_eq!(inventory.run.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(inventory.run.workers, 5);
    assert_eq!(inventory.run.checks.len(), 1);
    assert_eq!(inventory.run.checks[0].id, "system_domain_name");
    assert_eq!(inventory.run.policy.zero_counter, ZeroCounterPolicy::TreatAsAbsent);
    assert_eq!(inventory.run.policy.domain_name, DomainCheckPolicy::LegacyInverted);
}

#[test]
fn test_no_overrides_keeps_inventory() {
    let mut inventory = Inventory::from_toml_str(INVENTORY, "inline").unwrap();
    apply_overrides(&mut inventory, &run_args(&[])).unwrap();

    assert_eq!(inventory.run.output_dir, PathBuf::from("snapshots"));
    assert_eq!(inventory.run.workers, 2);
    assert_eq!(inventory.run.checks.len(), 9);
}

#[test]
fn test_unknown_check_override_is_an_error() {
    let mut inventory = Inventory::from_toml_str(INVENTORY, "inline").unwrap();
    let err = apply_overrides(&mut inventory, &run_args(&["--check", "bogus"])).unwrap_err();
    assert!(err.to_string().contains("bogus"));
}

// ============================================================================
// Live run
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_run_against_unreachable_device() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out");
    let inventory = tmp.path().join("yangwatch.toml");
    fs::write(
        &inventory,
        format!(
            "[settings]\noutput_dir = {:?}\ntimeout_secs = 5\n\n\
             [[devices]]\nalias = \"dead\"\nbase_url = \"http://127.0.0.1:1\"\n",
            out.display().to_string()
        ),
    )
    .unwrap();

    let inventory = inventory.display().to_string();
    let args = run_args(&["--inventory", &inventory, "--json"]);
    assert_eq!(handle_run(args).await.unwrap(), EXIT_CHECKS_FAILED);
    assert!(!out.join("dead_OpenConfig_Interfaces.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_missing_inventory_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("none.toml").display().to_string();

    let err = handle_run(run_args(&["--inventory", &missing])).await.unwrap_err();
    assert!(format!("{:#}", err).contains("none.toml"));
}

// ============================================================================
// Offline evaluation
// ============================================================================

#[test]
fn test_evaluate_failing_interfaces() {
    let tmp = TempDir::new().unwrap();
    let interfaces = write_json(
        &tmp,
        "csr1_OpenConfig_Interfaces.json",
        json!({"openconfig-interfaces:interfaces": {"interface": [
            {"name": "Gi0/1", "state": {"counters": {"in-discards": "5"}}}
        ]}}),
    );

    let args = evaluate_args(&["--interfaces", &interfaces, "--device", "csr1", "--json"]);
    assert_eq!(handle_evaluate(&args).unwrap(), EXIT_CHECKS_FAILED);
}

#[test]
fn test_evaluate_healthy_system() {
    let tmp = TempDir::new().unwrap();
    let system = write_json(
        &tmp,
        "csr1_OpenConfig_System.json",
        json!({"openconfig-system:system": {"state": {
            "motd-banner": "Authorized access only",
            "domain-name": "example.com"
        }}}),
    );

    let args = evaluate_args(&["--system", &system]);
    assert_eq!(handle_evaluate(&args).unwrap(), EXIT_SUCCESS);
}

#[test]
fn test_evaluate_legacy_domain_inversion() {
    let tmp = TempDir::new().unwrap();
    let system = write_json(
        &tmp,
        "sys.json",
        json!({"openconfig-system:system": {"state": {
            "motd-banner": "hi",
            "domain-name": "example.com"
        }}}),
    );

    let args = evaluate_args(&["--system", &system, "--legacy", "--json"]);
    assert_eq!(handle_evaluate(&args).unwrap(), EXIT_CHECKS_FAILED);
}

#[test]
fn test_evaluate_wrong_document_counts_as_failure() {
    let tmp = TempDir::new().unwrap();
    let system = write_json(&tmp, "sys.json", json!({"ietf-system:system": {}}));

    let args = evaluate_args(&["--system", &system, "--json"]);
    assert_eq!(handle_evaluate(&args).unwrap(), EXIT_CHECKS_FAILED);
}

#[test]
fn test_evaluate_missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("absent.json").display().to_string();

    let args = evaluate_args(&["--interfaces", &missing]);
    let err = handle_evaluate(&args).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.json"));
}

#[test]
fn test_checks_listing_succeeds() {
    assert_eq!(handle_checks(true).unwrap(), EXIT_SUCCESS);
}
