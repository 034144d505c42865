//! Device inventory and run settings.
//!
//! Inventory file: TOML, passed with `--inventory` (default `yangwatch.toml`).
//!
//! ```toml
//! [settings]
//! output_dir = "out"
//! workers = 4
//!
//! [policy]
//! zero_counter = "compare"
//!
//! [[devices]]
//! alias = "csr1000v-1"
//! base_url = "https://10.10.20.48"
//! username = "developer"
//! password_env = "CSR_PASSWORD"
//! ```

use crate::checks::{self, CheckDef};
use crate::error::ConfigError;
use crate::evaluator::EvalPolicy;
use crate::transport::HttpSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default inventory file name
pub const DEFAULT_INVENTORY: &str = "yangwatch.toml";

/// Global settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Directory for persisted documents
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Devices processed concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Lab devices usually present self-signed certificates
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Check ids to run; empty runs all
    #[serde(default)]
    pub checks: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_workers() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_verify_tls() -> bool {
    true
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
            verify_tls: default_verify_tls(),
            checks: Vec::new(),
        }
    }
}

/// One `[[devices]]` entry as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub alias: String,
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Name of an environment variable holding the password
    #[serde(default)]
    pub password_env: Option<String>,
}

/// Inventory file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFile {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub policy: EvalPolicy,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// A device ready to be contacted
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceTarget {
    pub alias: String,
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for DeviceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceTarget")
            .field("alias", &self.alias)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Everything the runner needs besides the transport
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub output_dir: PathBuf,
    pub workers: usize,
    pub checks: Vec<&'static CheckDef>,
    pub policy: EvalPolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            workers: default_workers(),
            checks: checks::CHECKS.iter().collect(),
            policy: EvalPolicy::default(),
        }
    }
}

/// Validated inventory
#[derive(Debug, Clone)]
pub struct Inventory {
    pub devices: Vec<DeviceTarget>,
    pub run: RunSettings,
    pub http: HttpSettings,
}

impl Inventory {
    /// Load and validate an inventory file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents, &path.display().to_string())
    }

    /// Parse inventory text; `origin` names the source in error messages
    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: InventoryFile = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Self::from_file(file, |var| std::env::var(var).ok())
    }

    /// Validate parsed contents, resolving `password_env` through `lookup`
    pub fn from_file(
        file: InventoryFile,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if file.devices.is_empty() {
            return Err(ConfigError::Invalid("no devices defined".to_string()));
        }
        if file.settings.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        let mut devices = Vec::with_capacity(file.devices.len());
        for device in file.devices {
            validate_alias(&device.alias)?;
            if !seen.insert(device.alias.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate device alias '{}'",
                    device.alias
                )));
            }
            if !(device.base_url.starts_with("http://") || device.base_url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "device '{}': base_url must start with http:// or https://",
                    device.alias
                )));
            }

            let password = match (&device.password, &device.password_env) {
                (Some(password), _) => Some(password.clone()),
                (None, Some(var)) => Some(lookup(var).ok_or_else(|| ConfigError::MissingSecret {
                    alias: device.alias.clone(),
                    var: var.clone(),
                })?),
                (None, None) => None,
            };

            devices.push(DeviceTarget {
                alias: device.alias,
                base_url: device.base_url,
                username: device.username,
                password,
            });
        }

        Ok(Self {
            devices,
            run: RunSettings {
                output_dir: file.settings.output_dir,
                workers: file.settings.workers,
                checks: checks::select(&file.settings.checks)?,
                policy: file.policy,
            },
            http: HttpSettings {
                timeout_secs: file.settings.timeout_secs,
                verify_tls: file.settings.verify_tls,
            },
        })
    }
}

/// Aliases become file name prefixes.
fn validate_alias(alias: &str) -> Result<(), ConfigError> {
    if alias.trim().is_empty() {
        return Err(ConfigError::Invalid("device alias is empty".to_string()));
    }
    if alias.contains(['/', '\\']) || alias == "." || alias == ".." {
        return Err(ConfigError::Invalid(format!(
            "device alias '{}' cannot be used as a file name",
            alias
        )));
    }
    Ok(())
}
