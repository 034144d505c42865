//! OpenConfig document model.
//!
//! Typed views over the two RESTCONF payloads a device is asked for. Decoding
//! is tolerant: a leaf that is missing or unusable becomes `None` instead of
//! failing the whole document, so field presence is always explicit.

use crate::error::DocumentError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Container carried only by ethernet interfaces.
pub const ETHERNET_CONTAINER: &str = "openconfig-if-ethernet:ethernet";

/// The two documents fetched from every device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Interfaces,
    System,
}

impl DocumentKind {
    /// Fetch order used by the runner.
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Interfaces, DocumentKind::System];

    /// RESTCONF resource path
    pub fn resource_path(self) -> &'static str {
        match self {
            Self::Interfaces => "/restconf/data/openconfig-interfaces:interfaces",
            Self::System => "/restconf/data/openconfig-system:system",
        }
    }

    /// Top-level key of the response body
    pub fn container_key(self) -> &'static str {
        match self {
            Self::Interfaces => "openconfig-interfaces:interfaces",
            Self::System => "openconfig-system:system",
        }
    }

    /// Suffix used when the document is persisted
    pub fn file_label(self) -> &'static str {
        match self {
            Self::Interfaces => "OpenConfig_Interfaces",
            Self::System => "OpenConfig_System",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interfaces => write!(f, "interfaces"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Interface counters inspected by the health checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterField {
    InDiscards,
    InErrors,
    InFcsErrors,
    InUnknownProtos,
    OutDiscards,
    OutErrors,
}

impl CounterField {
    pub const ALL: [CounterField; 6] = [
        CounterField::InDiscards,
        CounterField::InErrors,
        CounterField::InFcsErrors,
        CounterField::InUnknownProtos,
        CounterField::OutDiscards,
        CounterField::OutErrors,
    ];

    /// Leaf name under `state.counters`
    pub fn leaf(self) -> &'static str {
        match self {
            Self::InDiscards => "in-discards",
            Self::InErrors => "in-errors",
            Self::InFcsErrors => "in-fcs-errors",
            Self::InUnknownProtos => "in-unknown-protos",
            Self::OutDiscards => "out-discards",
            Self::OutErrors => "out-errors",
        }
    }
}

/// A counter leaf as reported by the device.
///
/// RFC 7951 encodes uint64 as a JSON string, but devices also send plain
/// numbers. The encoding is kept because the legacy evaluation treats a
/// numeric `0` and the string `"0"` differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterValue {
    pub value: u64,
    /// Sent as a JSON string
    pub quoted: bool,
}

impl CounterValue {
    pub fn from_number(value: u64) -> Self {
        Self {
            value,
            quoted: false,
        }
    }

    pub fn from_string(value: u64) -> Self {
        Self {
            value,
            quoted: true,
        }
    }
}

/// `state.counters` of one interface. `None` means the leaf was not reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub in_discards: Option<CounterValue>,
    pub in_errors: Option<CounterValue>,
    pub in_fcs_errors: Option<CounterValue>,
    pub in_unknown_protos: Option<CounterValue>,
    pub out_discards: Option<CounterValue>,
    pub out_errors: Option<CounterValue>,
}

impl InterfaceCounters {
    pub fn value(&self, field: CounterField) -> Option<CounterValue> {
        match field {
            CounterField::InDiscards => self.in_discards,
            CounterField::InErrors => self.in_errors,
            CounterField::InFcsErrors => self.in_fcs_errors,
            CounterField::InUnknownProtos => self.in_unknown_protos,
            CounterField::OutDiscards => self.out_discards,
            CounterField::OutErrors => self.out_errors,
        }
    }

    pub fn get(&self, field: CounterField) -> Option<u64> {
        self.value(field).map(|c| c.value)
    }
}

/// `openconfig-if-ethernet:ethernet/state`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthernetState {
    pub negotiated_duplex_mode: Option<String>,
}

/// One entry of the `interface` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub name: String,
    pub counters: InterfaceCounters,
    /// Present only for ethernet interfaces
    pub ethernet: Option<EthernetState>,
}

impl InterfaceRecord {
    pub fn is_ethernet(&self) -> bool {
        self.ethernet.is_some()
    }
}

/// Decoded `openconfig-interfaces:interfaces` payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfacesDocument {
    pub interfaces: Vec<InterfaceRecord>,
}

// Wire shapes. Counters stay raw JSON so one bad leaf only loses itself.

#[derive(Deserialize)]
struct WireInterfaces {
    /// RESTCONF omits empty lists entirely.
    #[serde(default)]
    interface: Option<Vec<WireInterface>>,
}

#[derive(Deserialize)]
struct WireInterface {
    name: String,
    #[serde(default)]
    state: Option<WireInterfaceState>,
    #[serde(rename = "openconfig-if-ethernet:ethernet", default)]
    ethernet: Option<WireEthernet>,
}

#[derive(Deserialize)]
struct WireInterfaceState {
    #[serde(default)]
    counters: Option<WireCounters>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireCounters {
    in_discards: Option<Value>,
    in_errors: Option<Value>,
    in_fcs_errors: Option<Value>,
    in_unknown_protos: Option<Value>,
    out_discards: Option<Value>,
    out_errors: Option<Value>,
}

impl WireCounters {
    fn raw(&self, field: CounterField) -> Option<&Value> {
        match field {
            CounterField::InDiscards => self.in_discards.as_ref(),
            CounterField::InErrors => self.in_errors.as_ref(),
            CounterField::InFcsErrors => self.in_fcs_errors.as_ref(),
            CounterField::InUnknownProtos => self.in_unknown_protos.as_ref(),
            CounterField::OutDiscards => self.out_discards.as_ref(),
            CounterField::OutErrors => self.out_errors.as_ref(),
        }
    }
}

#[derive(Deserialize)]
struct WireEthernet {
    #[serde(default)]
    state: Option<WireEthernetState>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireEthernetState {
    #[serde(default, deserialize_with = "present_leaf")]
    negotiated_duplex_mode: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct WireSystemState {
    #[serde(default, deserialize_with = "present_leaf")]
    motd_banner: Option<String>,
    #[serde(default, deserialize_with = "present_leaf")]
    domain_name: Option<String>,
}

/// Text of a leaf that is present. `null` is kept as an empty value so
/// presence survives; only a missing key becomes `None` (via `default`).
fn present_leaf<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }))
}

/// Top-level container of a payload, which must be a JSON object
fn container(doc: &Value, kind: DocumentKind) -> Result<&Value, DocumentError> {
    let key = kind.container_key();
    doc.get(key)
        .filter(|c| c.is_object())
        .ok_or(DocumentError::MissingContainer(key))
}

impl InterfacesDocument {
    pub fn from_json(doc: &Value) -> Result<Self, DocumentError> {
        let wire = WireInterfaces::deserialize(container(doc, DocumentKind::Interfaces)?)
            .map_err(|e| DocumentError::Decode(e.to_string()))?;

        let interfaces = wire
            .interface
            .unwrap_or_default()
            .into_iter()
            .map(InterfaceRecord::from)
            .collect();

        Ok(Self { interfaces })
    }
}

impl From<WireInterface> for InterfaceRecord {
    fn from(wire: WireInterface) -> Self {
        let name = wire.name;
        let counters = wire
            .state
            .and_then(|s| s.counters)
            .map(|raw| InterfaceCounters {
                in_discards: decode_counter(&name, CounterField::InDiscards, &raw),
                in_errors: decode_counter(&name, CounterField::InErrors, &raw),
                in_fcs_errors: decode_counter(&name, CounterField::InFcsErrors, &raw),
                in_unknown_protos: decode_counter(&name, CounterField::InUnknownProtos, &raw),
                out_discards: decode_counter(&name, CounterField::OutDiscards, &raw),
                out_errors: decode_counter(&name, CounterField::OutErrors, &raw),
            })
            .unwrap_or_default();

        let ethernet = wire.ethernet.map(|eth| EthernetState {
            negotiated_duplex_mode: eth.state.and_then(|s| s.negotiated_duplex_mode),
        });

        Self {
            name,
            counters,
            ethernet,
        }
    }
}

/// Null is silently absent; negative, fractional or non-numeric values are
/// absent with a warning.
fn decode_counter(interface: &str, field: CounterField, counters: &WireCounters) -> Option<CounterValue> {
    let value = counters.raw(field)?;
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => n.as_u64().map(CounterValue::from_number),
        Value::String(s) => s.trim().parse::<u64>().ok().map(CounterValue::from_string),
        _ => None,
    };
    if parsed.is_none() {
        warn!(
            "{}: ignoring unusable {} value {}",
            interface,
            field.leaf(),
            value
        );
    }
    parsed
}

/// `openconfig-system:system/state`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemRecord {
    pub motd_banner: Option<String>,
    pub domain_name: Option<String>,
}

/// Decoded `openconfig-system:system` payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemDocument {
    pub state: SystemRecord,
}

impl SystemDocument {
    pub fn from_json(doc: &Value) -> Result<Self, DocumentError> {
        let state = container(doc, DocumentKind::System)?
            .get("state")
            .filter(|s| s.is_object())
            .ok_or(DocumentError::MissingContainer("state"))?;

        let wire =
            WireSystemState::deserialize(state).map_err(|e| DocumentError::Decode(e.to_string()))?;

        Ok(Self {
            state: SystemRecord {
                motd_banner: wire.motd_banner,
                domain_name: wire.domain_name,
            },
        })
    }
}

/// Either decoded document, as handed to the evaluator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    Interfaces(InterfacesDocument),
    System(SystemDocument),
}

impl Document {
    pub fn decode(kind: DocumentKind, raw: &Value) -> Result<Self, DocumentError> {
        match kind {
            DocumentKind::Interfaces => InterfacesDocument::from_json(raw).map(Self::Interfaces),
            DocumentKind::System => SystemDocument::from_json(raw).map(Self::System),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Interfaces(_) => DocumentKind::Interfaces,
            Self::System(_) => DocumentKind::System,
        }
    }
}
