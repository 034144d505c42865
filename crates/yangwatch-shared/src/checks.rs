//! Health check table.
//!
//! Every check is a row of data; the evaluator is the only code that
//! interprets it. Thresholds are fixed here and nowhere else.

use crate::document::{CounterField, DocumentKind};
use crate::error::ConfigError;

/// Any counter above this value fails its check
pub const COUNTER_THRESHOLD: u64 = 0;

/// Expected negotiated duplex mode on ethernet interfaces
pub const EXPECTED_DUPLEX: &str = "FULL";

/// Field of an entry inspected by a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckField {
    Counter(CounterField),
    DuplexMode,
    MotdBanner,
    DomainName,
}

/// How an extracted value is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Fails when the value is strictly greater than the threshold
    GreaterThan(u64),
    /// Fails when the text differs from the expected value
    Equals(&'static str),
    /// Fails when the field is absent. `present_label` replaces the value in
    /// the report when set; `absent_label` is reported when missing.
    Present {
        present_label: Option<&'static str>,
        absent_label: &'static str,
    },
}

/// Which entries a check looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applicability {
    Always,
    /// Interfaces without the ethernet container are skipped entirely
    EthernetOnly,
}

/// Static definition of one health check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDef {
    pub id: &'static str,
    pub document: DocumentKind,
    pub field: CheckField,
    pub comparison: Comparison,
    pub applicability: Applicability,
    /// Column header for the observed value
    pub value_header: &'static str,
    pub pass_message: &'static str,
    pub fail_message: &'static str,
}

const fn counter_check(
    id: &'static str,
    field: CounterField,
    value_header: &'static str,
    pass_message: &'static str,
    fail_message: &'static str,
) -> CheckDef {
    CheckDef {
        id,
        document: DocumentKind::Interfaces,
        field: CheckField::Counter(field),
        comparison: Comparison::GreaterThan(COUNTER_THRESHOLD),
        applicability: Applicability::Always,
        value_header,
        pass_message,
        fail_message,
    }
}

/// All checks, in execution order
pub static CHECKS: [CheckDef; 9] = [
    counter_check(
        "interface_input_discards",
        CounterField::InDiscards,
        "Input Discard Counter",
        "No interfaces have input discards",
        "Some interfaces have input discards",
    ),
    counter_check(
        "interface_input_errors",
        CounterField::InErrors,
        "Input Errors Counter",
        "No interfaces have input errors",
        "Some interfaces have input errors",
    ),
    counter_check(
        "interface_input_fcs_errors",
        CounterField::InFcsErrors,
        "Input FCS Errors Counter",
        "No interfaces have input fcs errors",
        "Some interfaces have input fcs errors",
    ),
    counter_check(
        "interface_input_unknown_protocols",
        CounterField::InUnknownProtos,
        "Input Unknown Protocols Counter",
        "No interfaces have input unknown protocols",
        "Some interfaces have input unknown protocols",
    ),
    counter_check(
        "interface_output_discards",
        CounterField::OutDiscards,
        "Output Discards Counter",
        "No interfaces have output discards",
        "Some interfaces have output discards",
    ),
    counter_check(
        "interface_output_errors",
        CounterField::OutErrors,
        "Output Errors Counter",
        "No interfaces have output errors",
        "Some interfaces have output errors",
    ),
    CheckDef {
        id: "interface_full_duplex",
        document: DocumentKind::Interfaces,
        field: CheckField::DuplexMode,
        comparison: Comparison::Equals(EXPECTED_DUPLEX),
        applicability: Applicability::EthernetOnly,
        value_header: "Duplex Mode",
        pass_message: "All interfaces are full duplex",
        fail_message: "Some interfaces are half duplex",
    },
    CheckDef {
        id: "system_motd",
        document: DocumentKind::System,
        field: CheckField::MotdBanner,
        comparison: Comparison::Present {
            present_label: Some("Has a Banner"),
            absent_label: "No Banner",
        },
        applicability: Applicability::Always,
        value_header: "Has Banner",
        pass_message: "Device Has A MOTD Banner",
        fail_message: "Device Does Not Have A MOTD Banner",
    },
    CheckDef {
        id: "system_domain_name",
        document: DocumentKind::System,
        field: CheckField::DomainName,
        comparison: Comparison::Present {
            present_label: None,
            absent_label: "No Domain",
        },
        applicability: Applicability::Always,
        value_header: "Has Domain",
        pass_message: "Device Has A Domain Name",
        fail_message: "Device Does Not Have A Domain Name",
    },
];

/// Look up a check by id
pub fn find(id: &str) -> Option<&'static CheckDef> {
    CHECKS.iter().find(|c| c.id == id)
}

/// Resolve a selection of ids; an empty selection means every check.
/// The result keeps table order regardless of the order of `ids`.
pub fn select(ids: &[String]) -> Result<Vec<&'static CheckDef>, ConfigError> {
    if ids.is_empty() {
        return Ok(CHECKS.iter().collect());
    }

    for id in ids {
        if find(id).is_none() {
            return Err(ConfigError::UnknownCheck(id.clone()));
        }
    }

    Ok(CHECKS
        .iter()
        .filter(|c| ids.iter().any(|id| id == c.id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_nine_unique_ids() {
        let mut ids: Vec<_> = CHECKS.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn test_seven_interface_checks_two_system_checks() {
        let interfaces = CHECKS
            .iter()
            .filter(|c| c.document == DocumentKind::Interfaces)
            .count();
        let system = CHECKS
            .iter()
            .filter(|c| c.document == DocumentKind::System)
            .count();
        assert_eq!(interfaces, 7);
        assert_eq!(system, 2);
    }

    #[test]
    fn test_counter_thresholds_are_zero() {
        for check in CHECKS.iter() {
            if let CheckField::Counter(_) = check.field {
                assert_eq!(check.comparison, Comparison::GreaterThan(0), "{}", check.id);
            }
        }
    }

    #[test]
    fn test_select_keeps_table_order() {
        let picked = select(&[
            "system_motd".to_string(),
            "interface_input_errors".to_string(),
        ])
        .unwrap();
        let ids: Vec<_> = picked.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["interface_input_errors", "system_motd"]);
    }

    #[test]
    fn test_select_empty_means_all() {
        assert_eq!(select(&[]).unwrap().len(), CHECKS.len());
    }

    #[test]
    fn test_select_unknown_id() {
        let err = select(&["interface_crc".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCheck(id) if id == "interface_crc"));
    }
}
