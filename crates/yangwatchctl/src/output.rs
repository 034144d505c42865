//! Terminal output - ASCII only, colour on verdicts

use owo_colors::OwoColorize;
use yangwatch_shared::checks::CheckDef;
use yangwatch_shared::report::{format_summary_table, RunSummary};
use yangwatch_shared::runner::{DeviceReport, DeviceVerdict};

/// Width of the device column in verdict lines
const KEY_WIDTH: usize = 16;

/// Coloured verdict tag
pub fn verdict_tag(verdict: DeviceVerdict) -> String {
    match verdict {
        DeviceVerdict::Passed => "[PASSED]".bright_green().to_string(),
        DeviceVerdict::Failed => "[FAILED]".bright_red().to_string(),
        DeviceVerdict::Errored => "[ERRORED]".yellow().to_string(),
    }
}

/// Summary table, then one verdict line per device with the reasons below it
pub fn print_run(summary: &RunSummary, reports: &[DeviceReport]) {
    println!();
    println!("{}", format_summary_table(summary));
    println!();

    for report in reports {
        println!(
            "{:width$} {}",
            report.device,
            verdict_tag(report.verdict()),
            width = KEY_WIDTH
        );

        for section in &report.sections {
            if let Some(err) = &section.error {
                println!("  {} {}: {}", "[ERROR]".bright_red(), section.kind, err);
            }
            if let Some(err) = &section.persist_error {
                println!(
                    "  {} {} not saved: {}",
                    "[NOTE]".yellow(),
                    section.kind,
                    err
                );
            }
            for outcome in section.outcomes.iter().filter(|o| o.is_failed()) {
                let entries: Vec<String> = outcome
                    .failing_entries()
                    .map(|(entry, value)| format!("{}={}", entry, value))
                    .collect();
                println!(
                    "  {} {}: {} ({})",
                    "[FAIL]".bright_red(),
                    outcome.check_id,
                    outcome.message,
                    entries.join(", ")
                );
            }
        }
    }

    println!();
    println!(
        "{} passed, {} failed, {} errored",
        summary.count(DeviceVerdict::Passed),
        summary.count(DeviceVerdict::Failed),
        summary.count(DeviceVerdict::Errored)
    );
}

/// The check table as aligned text
pub fn print_checks(checks: &[CheckDef]) {
    let width = checks.iter().map(|c| c.id.len()).max().unwrap_or(0);
    for check in checks {
        println!(
            "{:width$}  {:10}  {}",
            check.id.cyan(),
            check.document.to_string(),
            check.value_header,
            width = width
        );
    }
}

/// Error line for failures that stop a command
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".bright_red(), err);
}
