//! Error types for yangwatch.

use thiserror::Error;

/// Failure of the single RESTCONF read for one document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    #[error("invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// A fetched payload that does not have the expected OpenConfig shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("missing container '{0}'")]
    MissingContainer(&'static str),

    #[error("malformed document: {0}")]
    Decode(String),
}

/// Inventory file problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid inventory: {0}")]
    Invalid(String),

    #[error("unknown check id '{0}'")]
    UnknownCheck(String),

    #[error("environment variable {var} for device '{alias}' is not set")]
    MissingSecret { alias: String, var: String },
}
