//! Command handlers for yangwatchctl.
//!
//! Each handler returns the process exit code; errors that stop a command
//! before any device is checked come back as `Err`.

use crate::cli::{EvaluateArgs, RunArgs};
use crate::errors::exit_code;
use crate::output;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use yangwatch_shared::checks::{self, CheckDef, CHECKS};
use yangwatch_shared::inventory::Inventory;
use yangwatch_shared::report::RunSummary;
use yangwatch_shared::runner::{evaluate_document, run_over_http, DeviceReport, SectionReport};
use yangwatch_shared::{Document, DocumentKind, EvalPolicy};

/// `--json` body for `run` and `evaluate`
#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a RunSummary,
    devices: &'a [DeviceReport],
}

/// `--json` body for `checks`
#[derive(Serialize)]
struct CheckListing<'a> {
    id: &'a str,
    document: DocumentKind,
    value_header: &'a str,
    pass_message: &'a str,
    fail_message: &'a str,
}

/// Handle run command
pub async fn handle_run(args: RunArgs) -> Result<i32> {
    let mut inventory = Inventory::load(&args.inventory)
        .with_context(|| format!("cannot use inventory {}", args.inventory.display()))?;
    apply_overrides(&mut inventory, &args)?;

    info!(
        "checking {} device(s) with {} worker(s), {} check(s)",
        inventory.devices.len(),
        inventory.run.workers,
        inventory.run.checks.len()
    );

    let settings = Arc::new(inventory.run);
    let reports = run_over_http(inventory.http, inventory.devices, Arc::clone(&settings))
        .await
        .context("cannot create RESTCONF client")?;

    finish(&reports, &settings.checks, args.json)
}

/// Command-line flags win over the inventory file
pub fn apply_overrides(inventory: &mut Inventory, args: &RunArgs) -> Result<()> {
    if let Some(dir) = &args.output_dir {
        inventory.run.output_dir = dir.clone();
    }
    if let Some(workers) = args.workers {
        inventory.run.workers = workers;
    }
    if !args.checks.is_empty() {
        inventory.run.checks = checks::select(&args.checks)?;
    }
    if args.legacy {
        inventory.run.policy = EvalPolicy::legacy();
    }
    Ok(())
}

/// Handle evaluate command
pub fn handle_evaluate(args: &EvaluateArgs) -> Result<i32> {
    let policy = if args.legacy {
        EvalPolicy::legacy()
    } else {
        EvalPolicy::default()
    };

    let inputs = [
        (DocumentKind::Interfaces, args.interfaces.as_deref()),
        (DocumentKind::System, args.system.as_deref()),
    ];

    // Checks whose document was not supplied are left out of the summary.
    let selected: Vec<&'static CheckDef> = checks::select(&args.checks)?
        .into_iter()
        .filter(|c| inputs.iter().any(|(kind, path)| *kind == c.document && path.is_some()))
        .collect();

    let mut sections = Vec::new();
    for (kind, path) in inputs {
        let Some(path) = path else { continue };
        if !selected.iter().any(|c| c.document == kind) {
            continue;
        }
        sections.push(evaluate_file(&args.device, kind, path, &selected, &policy)?);
    }

    let report = DeviceReport {
        device: args.device.clone(),
        sections,
    };
    finish(std::slice::from_ref(&report), &selected, args.json)
}

fn evaluate_file(
    device: &str,
    kind: DocumentKind,
    path: &Path,
    selected: &[&'static CheckDef],
    policy: &EvalPolicy,
) -> Result<SectionReport> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let mut section = SectionReport {
        kind,
        persisted: None,
        persist_error: None,
        error: None,
        outcomes: Vec::new(),
    };
    match Document::decode(kind, &raw) {
        Ok(document) => section.outcomes = evaluate_document(device, &document, selected, policy),
        Err(e) => {
            warn!("{}: {} unusable: {}", device, path.display(), e);
            section.error = Some(e.to_string());
        }
    }
    Ok(section)
}

/// Handle checks command
pub fn handle_checks(json: bool) -> Result<i32> {
    if json {
        let listing: Vec<CheckListing> = CHECKS
            .iter()
            .map(|c| CheckListing {
                id: c.id,
                document: c.document,
                value_header: c.value_header,
                pass_message: c.pass_message,
                fail_message: c.fail_message,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        output::print_checks(&CHECKS);
    }
    Ok(exit_code(true))
}

fn finish(reports: &[DeviceReport], selected: &[&'static CheckDef], json: bool) -> Result<i32> {
    let summary = RunSummary::from_reports(reports, selected);

    if json {
        let body = JsonReport {
            summary: &summary,
            devices: reports,
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        output::print_run(&summary, reports);
    }

    Ok(exit_code(summary.is_success()))
}
