//! Shared library for yangwatch.
//!
//! Fetches OpenConfig state from network devices over RESTCONF and evaluates
//! it against fixed health thresholds.

pub mod checks;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod fetcher;
pub mod inventory;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod transport;

pub use document::{Document, DocumentKind};
pub use error::{ConfigError, DocumentError, TransportError};
pub use evaluator::{evaluate, EvalPolicy};
pub use outcome::{CheckOutcome, CheckResult, ObservedValue, Verdict};
