//! Threshold evaluator.
//!
//! A single pure routine drives all nine checks from the table in
//! `checks`. It holds no state between calls, so devices can be evaluated
//! from any number of threads.
//!
//! Two historical behaviours are available behind `EvalPolicy::legacy()`:
//! - a falsy value (a numeric counter `0`, an empty duplex string) was
//!   reported as N/A instead of being compared, so healthy zero counters never
//!   showed "Passed". A counter sent as the string `"0"` was not falsy and
//!   was compared normally;
//! - the domain-name check failed when a domain was configured and passed
//!   when none was.
//!
//! The default policy corrects both.

use crate::checks::{Applicability, CheckDef, CheckField, Comparison};
use crate::document::{CounterValue, Document, InterfaceRecord, SystemRecord};
use crate::outcome::{CheckOutcome, CheckResult, ObservedValue, Verdict};
use serde::{Deserialize, Serialize};

/// Handling of values that are present but zero / empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroCounterPolicy {
    /// Compare zero like any other value (zero counters pass)
    #[default]
    Compare,
    /// Report a numeric zero or an empty text as N/A without comparing
    TreatAsAbsent,
}

/// Direction of the domain-name presence check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainCheckPolicy {
    /// Fail when no domain name is configured
    #[default]
    RequirePresent,
    /// Fail when a domain name is configured, pass when it is missing
    LegacyInverted,
}

/// Evaluation switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalPolicy {
    #[serde(default)]
    pub zero_counter: ZeroCounterPolicy,
    #[serde(default)]
    pub domain_name: DomainCheckPolicy,
}

impl EvalPolicy {
    /// Reproduce historical reports exactly
    pub fn legacy() -> Self {
        Self {
            zero_counter: ZeroCounterPolicy::TreatAsAbsent,
            domain_name: DomainCheckPolicy::LegacyInverted,
        }
    }
}

/// Value of a field as extracted from one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldValue<'a> {
    Absent,
    Count(CounterValue),
    Text(&'a str),
}

impl FieldValue<'_> {
    /// Falsy in the historical sense: the quoted `"0"` is a non-empty string.
    fn is_falsy(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            FieldValue::Count(c) => !c.quoted && c.value == 0,
            FieldValue::Text(s) => s.is_empty(),
        }
    }

    fn observed(&self) -> ObservedValue {
        match self {
            FieldValue::Absent => ObservedValue::NotApplicable,
            FieldValue::Count(c) => ObservedValue::Count(c.value),
            FieldValue::Text(s) => ObservedValue::Text(s.to_string()),
        }
    }
}

/// Evaluate one check for one device.
///
/// A check evaluated against the other document kind sees no entries and
/// passes trivially.
pub fn evaluate(
    check: &CheckDef,
    device: &str,
    document: &Document,
    policy: &EvalPolicy,
) -> CheckOutcome {
    let results: Vec<CheckResult> = match document {
        Document::Interfaces(doc) if check.document == document.kind() => doc
            .interfaces
            .iter()
            .filter(|intf| applies(check.applicability, intf))
            .map(|intf| {
                let (value, verdict) = judge(check, interface_field(check.field, intf), policy);
                CheckResult {
                    device: device.to_string(),
                    entry: intf.name.clone(),
                    value,
                    verdict,
                }
            })
            .collect(),
        Document::System(doc) if check.document == document.kind() => {
            let (value, verdict) = judge(check, system_field(check.field, &doc.state), policy);
            vec![CheckResult {
                device: device.to_string(),
                entry: device.to_string(),
                value,
                verdict,
            }]
        }
        _ => Vec::new(),
    };

    aggregate(check, device, results)
}

/// Failed iff any entry failed; N/A entries never flip the aggregate.
fn aggregate(check: &CheckDef, device: &str, results: Vec<CheckResult>) -> CheckOutcome {
    let failed = results.iter().any(|r| r.verdict == Verdict::Failed);
    let (verdict, message) = if failed {
        (Verdict::Failed, check.fail_message)
    } else {
        (Verdict::Passed, check.pass_message)
    };

    CheckOutcome {
        check_id: check.id.to_string(),
        device: device.to_string(),
        verdict,
        message: message.to_string(),
        results,
    }
}

fn applies(applicability: Applicability, intf: &InterfaceRecord) -> bool {
    match applicability {
        Applicability::Always => true,
        Applicability::EthernetOnly => intf.is_ethernet(),
    }
}

fn interface_field(field: CheckField, intf: &InterfaceRecord) -> FieldValue<'_> {
    let value = match field {
        CheckField::Counter(counter) => intf.counters.value(counter).map(FieldValue::Count),
        CheckField::DuplexMode => intf
            .ethernet
            .as_ref()
            .and_then(|eth| eth.negotiated_duplex_mode.as_deref())
            .map(FieldValue::Text),
        CheckField::MotdBanner | CheckField::DomainName => None,
    };
    value.unwrap_or(FieldValue::Absent)
}

fn system_field(field: CheckField, state: &SystemRecord) -> FieldValue<'_> {
    let value = match field {
        CheckField::MotdBanner => state.motd_banner.as_deref(),
        CheckField::DomainName => state.domain_name.as_deref(),
        CheckField::Counter(_) | CheckField::DuplexMode => None,
    };
    value.map(FieldValue::Text).unwrap_or(FieldValue::Absent)
}

fn judge(check: &CheckDef, value: FieldValue<'_>, policy: &EvalPolicy) -> (ObservedValue, Verdict) {
    match check.comparison {
        Comparison::Present {
            present_label,
            absent_label,
        } => {
            let inverted = check.field == CheckField::DomainName
                && policy.domain_name == DomainCheckPolicy::LegacyInverted;
            match value {
                FieldValue::Absent => {
                    let verdict = if inverted { Verdict::Passed } else { Verdict::Failed };
                    (ObservedValue::Text(absent_label.to_string()), verdict)
                }
                present => {
                    let shown = present_label
                        .map(|label| ObservedValue::Text(label.to_string()))
                        .unwrap_or_else(|| present.observed());
                    let verdict = if inverted { Verdict::Failed } else { Verdict::Passed };
                    (shown, verdict)
                }
            }
        }
        Comparison::GreaterThan(threshold) => match skip_not_applicable(value, policy) {
            Some(count @ FieldValue::Count(c)) => {
                let verdict = if c.value > threshold { Verdict::Failed } else { Verdict::Passed };
                (count.observed(), verdict)
            }
            _ => not_applicable(),
        },
        Comparison::Equals(expected) => match skip_not_applicable(value, policy) {
            Some(text @ FieldValue::Text(mode)) => {
                let verdict = if mode != expected { Verdict::Failed } else { Verdict::Passed };
                (text.observed(), verdict)
            }
            _ => not_applicable(),
        },
    }
}

/// `None` when the value must be reported as N/A instead of compared.
fn skip_not_applicable<'a>(value: FieldValue<'a>, policy: &EvalPolicy) -> Option<FieldValue<'a>> {
    match value {
        FieldValue::Absent => None,
        v if policy.zero_counter == ZeroCounterPolicy::TreatAsAbsent && v.is_falsy() => None,
        v => Some(v),
    }
}

fn not_applicable() -> (ObservedValue, Verdict) {
    (ObservedValue::NotApplicable, Verdict::NotApplicable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::find;
    use crate::document::{EthernetState, InterfaceCounters, InterfacesDocument, SystemDocument};

    fn interfaces(records: Vec<InterfaceRecord>) -> Document {
        Document::Interfaces(InterfacesDocument { interfaces: records })
    }

    fn with_out_errors(name: &str, value: Option<CounterValue>) -> InterfaceRecord {
        InterfaceRecord {
            name: name.to_string(),
            counters: InterfaceCounters {
                out_errors: value,
                ..Default::default()
            },
            ethernet: None,
        }
    }

    #[test]
    fn test_policy_defaults_are_corrected() {
        let policy = EvalPolicy::default();
        assert_eq!(policy.zero_counter, ZeroCounterPolicy::Compare);
        assert_eq!(policy.domain_name, DomainCheckPolicy::RequirePresent);
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let check = find("interface_output_errors").unwrap();
        let doc = interfaces(vec![
            with_out_errors("Gi1", Some(CounterValue::from_number(0))),
            with_out_errors("Gi2", Some(CounterValue::from_string(1))),
        ]);
        let outcome = evaluate(check, "r1", &doc, &EvalPolicy::default());

        assert_eq!(outcome.results[0].verdict, Verdict::Passed);
        assert_eq!(outcome.results[1].verdict, Verdict::Failed);
        assert_eq!(outcome.message, "Some interfaces have output errors");
    }

    #[test]
    fn test_absent_counter_is_not_applicable_under_both_policies() {
        let check = find("interface_output_errors").unwrap();
        let doc = interfaces(vec![with_out_errors("Null0", None)]);

        for policy in [EvalPolicy::default(), EvalPolicy::legacy()] {
            let outcome = evaluate(check, "r1", &doc, &policy);
            assert_eq!(outcome.results[0].value, ObservedValue::NotApplicable);
            assert_eq!(outcome.results[0].verdict, Verdict::NotApplicable);
            assert_eq!(outcome.verdict, Verdict::Passed);
        }
    }

    #[test]
    fn test_legacy_empty_duplex_is_not_applicable() {
        let check = find("interface_full_duplex").unwrap();
        let doc = interfaces(vec![InterfaceRecord {
            name: "Gi3".to_string(),
            counters: InterfaceCounters::default(),
            ethernet: Some(EthernetState {
                negotiated_duplex_mode: Some(String::new()),
            }),
        }]);

        let legacy = evaluate(check, "r1", &doc, &EvalPolicy::legacy());
        assert_eq!(legacy.results[0].verdict, Verdict::NotApplicable);

        let corrected = evaluate(check, "r1", &doc, &EvalPolicy::default());
        assert_eq!(corrected.results[0].verdict, Verdict::Failed);
    }

    #[test]
    fn test_mismatched_document_yields_no_entries() {
        let check = find("system_motd").unwrap();
        let outcome = evaluate(check, "r1", &interfaces(vec![]), &EvalPolicy::default());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.verdict, Verdict::Passed);

        let check = find("interface_input_errors").unwrap();
        let system = Document::System(SystemDocument::default());
        assert!(evaluate(check, "r1", &system, &EvalPolicy::default()).results.is_empty());
    }

    #[test]
    fn test_policy_toml_names() {
        let policy: EvalPolicy =
            toml::from_str("zero_counter = \"treat-as-absent\"\ndomain_name = \"legacy-inverted\"")
                .unwrap();
        assert_eq!(policy, EvalPolicy::legacy());
    }
}
