//! Check results and per-device outcomes.

use serde::{Deserialize, Serialize};

/// Sentinel shown for entries that were not compared
pub const NOT_APPLICABLE: &str = "N/A";

/// Verdict of one entry, or of a whole check when aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
    NotApplicable,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "Passed"),
            Self::Failed => write!(f, "Failed"),
            Self::NotApplicable => write!(f, "{}", NOT_APPLICABLE),
        }
    }
}

/// Value observed on the device for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservedValue {
    Count(u64),
    Text(String),
    /// Serialized as `null`
    NotApplicable,
}

impl std::fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{}", s),
            Self::NotApplicable => write!(f, "{}", NOT_APPLICABLE),
        }
    }
}

/// Outcome for a single entry (interface, or the device itself for system checks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub device: String,
    pub entry: String,
    pub value: ObservedValue,
    pub verdict: Verdict,
}

/// Aggregate of one check over all entries of one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check_id: String,
    pub device: String,
    /// Passed or Failed, never NotApplicable
    pub verdict: Verdict,
    pub message: String,
    /// Every entry in document order
    pub results: Vec<CheckResult>,
}

impl CheckOutcome {
    pub fn is_failed(&self) -> bool {
        self.verdict == Verdict::Failed
    }

    /// Failing entries and their observed values, in document order.
    ///
    /// Callers use this to re-scope a follow-up run to the offending subset.
    pub fn failing_entries(&self) -> impl Iterator<Item = (&str, &ObservedValue)> {
        self.results
            .iter()
            .filter(|r| r.verdict == Verdict::Failed)
            .map(|r| (r.entry.as_str(), &r.value))
    }

    /// Count of entries with the given verdict
    pub fn count(&self, verdict: Verdict) -> usize {
        self.results.iter().filter(|r| r.verdict == verdict).count()
    }
}
