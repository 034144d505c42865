//! RESTCONF transport
//!
//! One blocking GET per document. No retry: a failed read fails the section
//! of the device that issued it and nothing else.

use crate::error::TransportError;
use crate::inventory::DeviceTarget;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Media type for RESTCONF JSON encoding (RFC 8040)
pub const YANG_JSON: &str = "application/yang-data+json";

/// Read access to a device's RESTCONF datastore
pub trait RestconfTransport: Send + Sync {
    /// Perform exactly one read of `path` and return the parsed body
    fn get_json(&self, device: &DeviceTarget, path: &str) -> Result<serde_json::Value, TransportError>;
}

/// Transport settings shared by every device
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub verify_tls: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            verify_tls: true,
        }
    }
}

/// Real transport over HTTPS
pub struct HttpRestconfClient {
    settings: HttpSettings,
    client: reqwest::blocking::Client,
}

impl HttpRestconfClient {
    pub fn new(settings: HttpSettings) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify_tls)
            .user_agent(format!("yangwatch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.settings.timeout_secs)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl RestconfTransport for HttpRestconfClient {
    fn get_json(&self, device: &DeviceTarget, path: &str) -> Result<serde_json::Value, TransportError> {
        let url = format!("{}{}", device.base_url.trim_end_matches('/'), path);
        debug!("{}: GET {}", device.alias, url);

        let mut request = self.client.get(&url).header("Accept", YANG_JSON);
        if let Some(username) = &device.username {
            request = request.basic_auth(username, device.password.as_deref());
        }

        let response = request.send().map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.text().map_err(|e| self.classify(e))?;
        serde_json::from_str(&body).map_err(|e| TransportError::InvalidJson(e.to_string()))
    }
}

/// Fake transport for testing
pub struct FakeRestconfTransport {
    responses: HashMap<(String, String), Result<serde_json::Value, TransportError>>,
    call_count: Mutex<usize>,
}

impl FakeRestconfTransport {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            call_count: Mutex::new(0),
        }
    }

    /// Register the answer for one device and path
    pub fn with_response(
        mut self,
        alias: &str,
        path: &str,
        response: Result<serde_json::Value, TransportError>,
    ) -> Self {
        self.responses
            .insert((alias.to_string(), path.to_string()), response);
        self
    }

    /// Number of reads issued so far
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FakeRestconfTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RestconfTransport for FakeRestconfTransport {
    fn get_json(&self, device: &DeviceTarget, path: &str) -> Result<serde_json::Value, TransportError> {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        self.responses
            .get(&(device.alias.clone(), path.to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Status {
                    status: 404,
                    path: path.to_string(),
                })
            })
    }
}
