//! Per-device pipeline and the device pool.
//!
//! For every device: fetch → persist → decode → evaluate, once per document.
//! Devices share nothing but the transport; a failure on one device never
//! touches another.

use crate::checks::CheckDef;
use crate::document::{Document, DocumentKind};
use crate::error::TransportError;
use crate::evaluator::{evaluate, EvalPolicy};
use crate::fetcher::{fetch_document, persist_document};
use crate::inventory::{DeviceTarget, RunSettings};
use crate::outcome::CheckOutcome;
use crate::report;
use crate::transport::{HttpRestconfClient, HttpSettings, RestconfTransport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Result of one document section (fetch, persist, checks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionReport {
    pub kind: DocumentKind,
    /// Where the raw document was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
    /// Fetch or decode failure; no checks ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub outcomes: Vec<CheckOutcome>,
}

impl SectionReport {
    fn errored(kind: DocumentKind, message: String) -> Self {
        Self {
            kind,
            persisted: None,
            persist_error: None,
            error: Some(message),
            outcomes: Vec::new(),
        }
    }
}

/// Overall status of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceVerdict {
    Passed,
    Failed,
    Errored,
}

impl std::fmt::Display for DeviceVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "PASSED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Errored => write!(f, "ERRORED"),
        }
    }
}

/// Everything learned about one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceReport {
    pub device: String,
    pub sections: Vec<SectionReport>,
}

impl DeviceReport {
    /// Failed wins over Errored: a real failure is the more useful signal.
    pub fn verdict(&self) -> DeviceVerdict {
        if self.outcomes().any(CheckOutcome::is_failed) {
            DeviceVerdict::Failed
        } else if self.sections.iter().any(|s| s.error.is_some()) {
            DeviceVerdict::Errored
        } else {
            DeviceVerdict::Passed
        }
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.sections.iter().flat_map(|s| s.outcomes.iter())
    }

    pub fn outcome(&self, check_id: &str) -> Option<&CheckOutcome> {
        self.outcomes().find(|o| o.check_id == check_id)
    }

    /// Whether `kind` was attempted but could not be evaluated
    pub fn section_error(&self, kind: DocumentKind) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .and_then(|s| s.error.as_deref())
    }
}

/// Run the given checks against a decoded document, logging each table.
pub fn evaluate_document(
    device: &str,
    document: &Document,
    checks: &[&'static CheckDef],
    policy: &EvalPolicy,
) -> Vec<CheckOutcome> {
    checks
        .iter()
        .filter(|c| c.document == document.kind())
        .map(|check| {
            let outcome = evaluate(check, device, document, policy);
            report::log_outcome(check, &outcome);
            outcome
        })
        .collect()
}

/// Fetch, persist and evaluate one document of one device
pub fn process_section(
    transport: &dyn RestconfTransport,
    device: &DeviceTarget,
    kind: DocumentKind,
    settings: &RunSettings,
) -> SectionReport {
    let raw = match fetch_document(transport, device, kind) {
        Ok(raw) => raw,
        Err(e) => {
            error!("{}: fetching {} document failed: {}", device.alias, kind, e);
            return SectionReport::errored(kind, e.to_string());
        }
    };

    // Persisting and checking are independent steps.
    let (persisted, persist_error) =
        match persist_document(&settings.output_dir, &device.alias, kind, &raw) {
            Ok(path) => (Some(path), None),
            Err(e) => {
                warn!("{}: could not persist {} document: {}", device.alias, kind, e);
                (None, Some(e.to_string()))
            }
        };

    let document = match Document::decode(kind, &raw) {
        Ok(doc) => doc,
        Err(e) => {
            error!("{}: {} document unusable: {}", device.alias, kind, e);
            return SectionReport {
                persisted,
                persist_error,
                ..SectionReport::errored(kind, e.to_string())
            };
        }
    };

    SectionReport {
        kind,
        persisted,
        persist_error,
        error: None,
        outcomes: evaluate_document(&device.alias, &document, &settings.checks, &settings.policy),
    }
}

/// Process every document kind that at least one selected check needs
pub fn process_device(
    transport: &dyn RestconfTransport,
    device: &DeviceTarget,
    settings: &RunSettings,
) -> DeviceReport {
    info!("{}: starting checks against {}", device.alias, device.base_url);

    let sections = DocumentKind::ALL
        .into_iter()
        .filter(|kind| settings.checks.iter().any(|c| c.document == *kind))
        .map(|kind| process_section(transport, device, kind, settings))
        .collect();

    let report = DeviceReport {
        device: device.alias.clone(),
        sections,
    };
    info!("{}: {}", device.alias, report.verdict());
    report
}

/// Report for a device whose worker never produced one
fn aborted_report(alias: &str, reason: &str) -> DeviceReport {
    error!("{}: device task aborted: {}", alias, reason);
    DeviceReport {
        device: alias.to_string(),
        sections: vec![SectionReport::errored(
            DocumentKind::Interfaces,
            format!("device task aborted: {}", reason),
        )],
    }
}

/// Process all devices on a bounded pool. There is exactly one report per
/// device, in input order, even when a worker panics.
pub async fn run_inventory(
    transport: Arc<dyn RestconfTransport>,
    devices: Vec<DeviceTarget>,
    settings: Arc<RunSettings>,
) -> Vec<DeviceReport> {
    let semaphore = Arc::new(Semaphore::new(settings.workers.max(1)));
    let aliases: Vec<String> = devices.iter().map(|d| d.alias.clone()).collect();
    let mut set = JoinSet::new();

    for (idx, device) in devices.into_iter().enumerate() {
        let transport = Arc::clone(&transport);
        let settings = Arc::clone(&settings);
        let semaphore = Arc::clone(&semaphore);

        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let joined = tokio::task::spawn_blocking(move || {
                process_device(transport.as_ref(), &device, &settings)
            })
            .await;
            (idx, joined)
        });
    }

    let mut slots: Vec<Option<DeviceReport>> = aliases.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, Ok(report))) => slots[idx] = Some(report),
            Ok((idx, Err(e))) => slots[idx] = Some(aborted_report(&aliases[idx], &e.to_string())),
            // The index is lost with the task; the gap is filled below.
            Err(e) => error!("device worker failed: {}", e),
        }
    }

    slots
        .into_iter()
        .zip(&aliases)
        .map(|(slot, alias)| slot.unwrap_or_else(|| aborted_report(alias, "worker lost")))
        .collect()
}

/// `run_inventory` over HTTPS.
///
/// The blocking client runs its own runtime: it must be created and dropped
/// on the blocking pool, never on an async worker.
pub async fn run_over_http(
    http: HttpSettings,
    devices: Vec<DeviceTarget>,
    settings: Arc<RunSettings>,
) -> Result<Vec<DeviceReport>, TransportError> {
    let client = tokio::task::spawn_blocking(move || HttpRestconfClient::new(http))
        .await
        .map_err(|e| TransportError::Http(format!("client setup aborted: {}", e)))??;

    let transport: Arc<dyn RestconfTransport> = Arc::new(client);
    let reports = run_inventory(Arc::clone(&transport), devices, settings).await;

    // Every worker has finished, so this is the last reference.
    if let Err(e) = tokio::task::spawn_blocking(move || drop(transport)).await {
        warn!("HTTP client shutdown failed: {}", e);
    }
    Ok(reports)
}
