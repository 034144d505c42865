//! Verdict reporting.
//!
//! Pure presentation: tables of check results for the log, and a run summary.
//! No business logic lives here.

use crate::checks::{self, CheckDef};
use crate::document::DocumentKind;
use crate::outcome::CheckOutcome;
use crate::runner::{DeviceReport, DeviceVerdict};
use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::Table;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Header of the verdict column
pub const VERDICT_HEADER: &str = "Passed/Failed";

/// Render the per-entry rows of one outcome.
///
/// Interface checks get a `Device | Interface | value | verdict` layout;
/// system checks have a single entry (the device), so the entry column is
/// dropped.
pub fn render_check_table(check: &CheckDef, outcome: &CheckOutcome) -> String {
    let per_interface = check.document == DocumentKind::Interfaces;

    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);

    if per_interface {
        table.set_header(vec!["Device", "Interface", check.value_header, VERDICT_HEADER]);
    } else {
        table.set_header(vec!["Device", check.value_header, VERDICT_HEADER]);
    }

    for row in &outcome.results {
        if per_interface {
            table.add_row(vec![
                row.device.clone(),
                row.entry.clone(),
                row.value.to_string(),
                row.verdict.to_string(),
            ]);
        } else {
            table.add_row(vec![
                row.device.clone(),
                row.value.to_string(),
                row.verdict.to_string(),
            ]);
        }
    }

    table.to_string()
}

/// Emit the table and verdict of one outcome to the log
pub fn log_outcome(check: &CheckDef, outcome: &CheckOutcome) {
    info!(
        "{} [{}]\n{}",
        outcome.device,
        check.id,
        render_check_table(check, outcome)
    );

    if outcome.is_failed() {
        let failing: Vec<String> = outcome
            .failing_entries()
            .map(|(entry, value)| format!("{}={}", entry, value))
            .collect();
        warn!("{}: {} ({})", outcome.device, outcome.message, failing.join(", "));
    } else {
        info!("{}: {}", outcome.device, outcome.message);
    }
}

/// Tally of one check across all devices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTally {
    pub check_id: String,
    pub passed: usize,
    pub failed: usize,
    /// Devices whose document could not be fetched or decoded
    pub errored: usize,
    /// Failing devices, in inventory order
    pub failed_devices: Vec<String>,
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub devices: Vec<(String, DeviceVerdict)>,
    pub checks: Vec<CheckTally>,
}

impl RunSummary {
    pub fn from_reports(reports: &[DeviceReport], selected: &[&'static CheckDef]) -> Self {
        let devices = reports
            .iter()
            .map(|r| (r.device.clone(), r.verdict()))
            .collect();

        let checks = selected
            .iter()
            .map(|check| {
                let mut tally = CheckTally {
                    check_id: check.id.to_string(),
                    ..Default::default()
                };
                for report in reports {
                    match report.outcome(check.id) {
                        Some(outcome) if outcome.is_failed() => {
                            tally.failed += 1;
                            tally.failed_devices.push(report.device.clone());
                        }
                        Some(_) => tally.passed += 1,
                        None => tally.errored += 1,
                    }
                }
                tally
            })
            .collect();

        Self { devices, checks }
    }

    /// True when every device passed
    pub fn is_success(&self) -> bool {
        self.devices
            .iter()
            .all(|(_, verdict)| *verdict == DeviceVerdict::Passed)
    }

    pub fn count(&self, verdict: DeviceVerdict) -> usize {
        self.devices.iter().filter(|(_, v)| *v == verdict).count()
    }
}

/// Plain-text rendering of the per-check tally
pub fn format_summary_table(summary: &RunSummary) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);
    table.set_header(vec!["Check", "Passed", "Failed", "Errored", "Failing devices"]);

    for tally in &summary.checks {
        let title = checks::find(&tally.check_id)
            .map(|c| c.value_header)
            .unwrap_or(tally.check_id.as_str());
        table.add_row(vec![
            format!("{} ({})", tally.check_id, title),
            tally.passed.to_string(),
            tally.failed.to_string(),
            tally.errored.to_string(),
            if tally.failed_devices.is_empty() {
                "-".to_string()
            } else {
                tally.failed_devices.join(", ")
            },
        ]);
    }

    table.to_string()
}
