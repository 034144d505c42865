//! State fetcher: read a document from a device and keep a copy on disk.

use crate::document::DocumentKind;
use crate::error::TransportError;
use crate::inventory::DeviceTarget;
use crate::transport::RestconfTransport;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fetch one document with a single read
pub fn fetch_document(
    transport: &dyn RestconfTransport,
    device: &DeviceTarget,
    kind: DocumentKind,
) -> Result<Value, TransportError> {
    let doc = transport.get_json(device, kind.resource_path())?;
    debug!("{}: fetched {} document", device.alias, kind);
    Ok(doc)
}

/// File name of a persisted document: `{alias}_{label}.json`
pub fn document_file_name(alias: &str, kind: DocumentKind) -> String {
    format!("{}_{}.json", alias, kind.file_label())
}

/// Write `doc` under `dir` with keys sorted and 4-space indentation.
pub fn persist_document(
    dir: &Path,
    alias: &str,
    kind: DocumentKind,
    doc: &Value,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(document_file_name(alias, kind));
    fs::write(&path, to_sorted_pretty(doc)?)?;
    info!("{}: wrote {}", alias, path.display());
    Ok(path)
}

/// Pretty-print with every object's keys in lexicographic order.
pub fn to_sorted_pretty(doc: &Value) -> io::Result<String> {
    let sorted = sort_keys(doc);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    sorted.serialize(&mut ser).map_err(io::Error::from)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            // Map keeps insertion order when serde_json's preserve_order is on.
            let mut out = Map::new();
            for (k, v) in entries {
                out.insert(k.clone(), sort_keys(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FakeRestconfTransport;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_document_file_names() {
        assert_eq!(
            document_file_name("csr1", DocumentKind::Interfaces),
            "csr1_OpenConfig_Interfaces.json"
        );
        assert_eq!(
            document_file_name("csr1", DocumentKind::System),
            "csr1_OpenConfig_System.json"
        );
    }

    #[test]
    fn test_sorted_pretty_output() {
        let doc = json!({"b": 1, "a": {"z": [], "y": {}}});
        let text = to_sorted_pretty(&doc).unwrap();
        assert_eq!(
            text,
            "{\n    \"a\": {\n        \"y\": {},\n        \"z\": []\n    },\n    \"b\": 1\n}"
        );
    }

    #[test]
    fn test_persist_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("out");
        let doc = json!({"openconfig-system:system": {"state": {"hostname": "r1"}}});

        let path = persist_document(&dir, "r1", DocumentKind::System, &doc).unwrap();
        assert_eq!(path, dir.join("r1_OpenConfig_System.json"));

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, doc);
    }

    #[test]
    fn test_fetch_uses_resource_path() {
        let device = DeviceTarget {
            alias: "r1".to_string(),
            base_url: "https://192.0.2.1".to_string(),
            username: None,
            password: None,
        };
        let transport = FakeRestconfTransport::new().with_response(
            "r1",
            "/restconf/data/openconfig-interfaces:interfaces",
            Ok(json!({"openconfig-interfaces:interfaces": {}})),
        );

        assert!(fetch_document(&transport, &device, DocumentKind::Interfaces).is_ok());
        assert!(fetch_document(&transport, &device, DocumentKind::System).is_err());
        assert_eq!(transport.call_count(), 2);
    }
}
