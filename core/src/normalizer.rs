//! Canonical forms for the boolean-like text columns.

use crate::{
    record::{RawTriggerRecord, TriggerRecord},
    types::{Tradeable, Tripped},
    warning::PipelineWarning,
};

/// Trim, upper-case, then map TRUE/FALSE. Anything else is kept in its
/// trimmed upper-case form.
pub fn normalize_tripped(raw: &str) -> Tripped {
    let canonical = raw.trim().to_uppercase();
    match canonical.as_str() {
        "TRUE" => Tripped::Flag(true),
        "FALSE" => Tripped::Flag(false),
        _ => Tripped::Unrecognized(canonical),
    }
}

/// Python-style truthiness of a raw `account_tradeable` cell.
/// Empty, "false", "f", "no", "n" and numeric zero are falsy.
pub fn is_truthy(raw: &str) -> bool {
    let value = raw.trim();
    if value.is_empty() {
        return false;
    }
    match value.to_ascii_lowercase().as_str() {
        "false" | "f" | "no" | "n" => false,
        _ => value.parse::<f64>().map(|n| n != 0.0).unwrap_or(true),
    }
}

/// Render a possibly missing `account_tradeable` value. Missing is FALSE.
pub fn normalize_tradeable(raw: Option<&str>) -> Tradeable {
    Tradeable::from(raw.is_some_and(is_truthy))
}

pub fn normalize_triggers(raw: &[RawTriggerRecord]) -> Vec<TriggerRecord> {
    raw.iter()
        .map(|r| TriggerRecord {
            row: r.row,
            account_canonical_id: r.account_canonical_id.clone(),
            run_datetime: r.run_datetime,
            trigger: r.trigger.clone(),
            tripped: normalize_tripped(&r.tripped),
            excess_cash_amount: r.excess_cash_amount,
        })
        .collect()
}

/// One warning per record whose `tripped` value was not recognized.
/// Run on deduplicated records so dropped rows are not reported.
pub fn unrecognized_tripped(records: &[TriggerRecord]) -> Vec<PipelineWarning> {
    records
        .iter()
        .filter_map(|r| match &r.tripped {
            Tripped::Unrecognized(value) => Some(PipelineWarning::UnrecognizedTripped {
                row: r.row,
                value: value.clone(),
            }),
            Tripped::Flag(_) => None,
        })
        .inspect(PipelineWarning::log)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tripped_is_case_and_whitespace_insensitive() {
        assert_eq!(normalize_tripped("  true "), Tripped::Flag(true));
        assert_eq!(normalize_tripped("False"), Tripped::Flag(false));
        assert_eq!(normalize_tripped("TRUE"), Tripped::Flag(true));
    }

    #[test]
    fn unrecognized_tripped_passes_through() {
        assert_eq!(
            normalize_tripped(" maybe "),
            Tripped::Unrecognized("MAYBE".into())
        );
        assert_eq!(normalize_tripped(""), Tripped::Unrecognized(String::new()));
    }

    #[test]
    fn truthiness() {
        for falsy in ["", " ", "false", "FALSE", "False", "f", "no", "N", "0", "0.0"] {
            assert!(!is_truthy(falsy), "{falsy:?} should be falsy");
        }
        for truthy in ["true", "TRUE", "t", "yes", "1", "2.5", "anything"] {
            assert!(is_truthy(truthy), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn missing_tradeable_is_false() {
        assert_eq!(normalize_tradeable(None), Tradeable::False);
        assert_eq!(normalize_tradeable(Some("True")), Tradeable::True);
    }

    #[test]
    fn only_unrecognized_values_are_reported() {
        let raw: Vec<RawTriggerRecord> = ["TRUE", " maybe", "false"]
            .iter()
            .enumerate()
            .map(|(i, tripped)| RawTriggerRecord {
                row: i + 1,
                account_canonical_id: format!("A{i}"),
                run_datetime: chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
                    .and_then(|d| d.and_hms_opt(9, 0, 0))
                    .unwrap(),
                trigger: "withdrawal".into(),
                tripped: tripped.to_string(),
                excess_cash_amount: None,
            })
            .collect();
        let warnings = unrecognized_tripped(&normalize_triggers(&raw));
        assert_eq!(
            warnings,
            vec![PipelineWarning::UnrecognizedTripped {
                row: 2,
                value: "MAYBE".into()
            }]
        );
    }
}
