use insights_core::{
    dedup::dedup_triggers,
    join::left_join,
    loader::parse_run_datetime,
    record::{TriggerRecord, ValidationRecord},
    types::{Tradeable, Tripped},
    warning::PipelineWarning,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn at(s: &str) -> chrono::NaiveDateTime {
    parse_run_datetime(s).expect("test timestamp")
}

fn trigger(row: usize, account: &str, when: &str, name: &str, amount: Option<f64>) -> TriggerRecord {
    TriggerRecord {
        row,
        account_canonical_id: account.into(),
        run_datetime: at(when),
        trigger: name.into(),
        tripped: Tripped::Flag(true),
        excess_cash_amount: amount,
    }
}

fn validation(
    row: usize,
    account: &str,
    when: &str,
    tradeable: Option<&str>,
    category: Option<&str>,
) -> ValidationRecord {
    ValidationRecord {
        row,
        account_canonical_id: account.into(),
        run_datetime: at(when),
        account_tradeable: tradeable.map(str::to_string),
        validation_category: category.map(str::to_string),
    }
}

const T1: &str = "2024-03-01 09:00:00";
const T2: &str = "2024-03-01 10:00:00";

// ── Deduplicator ─────────────────────────────────────────────────────────────

/// Two rows share (A, t1); only the first survives.
#[test]
fn duplicate_key_keeps_first_row() {
    let rows = vec![
        trigger(1, "A", T1, "withdrawal", Some(100.0)),
        trigger(2, "A", T1, "withdrawal", Some(999.0)),
    ];
    let kept = dedup_triggers(&rows);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].excess_cash_amount, Some(100.0));
    assert_eq!(kept[0].row, 1);
}

#[test]
fn dedup_preserves_order_of_first_occurrences() {
    let rows = vec![
        trigger(1, "B", T2, "x", None),
        trigger(2, "A", T1, "x", None),
        trigger(3, "B", T2, "y", None),
        trigger(4, "A", T2, "x", None),
        trigger(5, "A", T1, "z", None),
    ];
    let kept: Vec<usize> = dedup_triggers(&rows).iter().map(|r| r.row).collect();
    assert_eq!(kept, vec![1, 2, 4]);
}

#[test]
fn dedup_of_empty_is_empty() {
    assert!(dedup_triggers(&[]).is_empty());
}

#[test]
fn same_account_different_time_is_not_a_duplicate() {
    let rows = vec![trigger(1, "A", T1, "x", None), trigger(2, "A", T2, "x", None)];
    assert_eq!(dedup_triggers(&rows).len(), 2);
}

// ── Joiner ───────────────────────────────────────────────────────────────────

#[test]
fn matched_truthy_validation_is_tradeable() {
    let triggers = dedup_triggers(&[
        trigger(1, "A", T1, "withdrawal", Some(100.0)),
        trigger(2, "A", T1, "withdrawal", Some(999.0)),
    ]);
    let validations = vec![validation(1, "A", T1, Some("true"), None)];

    let out = left_join(&triggers, &validations);

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].account_tradeable, Tradeable::True);
    assert_eq!(out.records[0].excess_cash_amount, Some(100.0));
    assert!(out.warnings.is_empty());
}

/// No validation row for (B, t2): the trigger row survives as FALSE with
/// no category.
#[test]
fn unmatched_trigger_is_not_tradeable() {
    let triggers = vec![
        trigger(1, "A", T1, "withdrawal", Some(10.0)),
        trigger(2, "B", T2, "deposit", Some(20.0)),
    ];
    let validations = vec![validation(1, "A", T1, Some("True"), Some("ok"))];

    let out = left_join(&triggers, &validations);

    assert_eq!(out.records.len(), 2);
    let b = &out.records[1];
    assert_eq!(b.account_canonical_id, "B");
    assert_eq!(b.account_tradeable, Tradeable::False);
    assert_eq!(b.validation_category, None);
}

#[test]
fn falsy_and_missing_tradeable_values_render_false() {
    let triggers = vec![
        trigger(1, "A", T1, "x", None),
        trigger(2, "B", T1, "x", None),
        trigger(3, "C", T1, "x", None),
    ];
    let validations = vec![
        validation(1, "A", T1, Some("False"), Some("restricted_account")),
        validation(2, "B", T1, None, Some("pending_trade")),
        validation(3, "C", T1, Some("0"), None),
    ];

    let out = left_join(&triggers, &validations);
    for r in &out.records {
        assert_eq!(r.account_tradeable, Tradeable::False, "row {}", r.account_canonical_id);
    }
    assert_eq!(
        out.records[0].validation_category.as_deref(),
        Some("restricted_account")
    );
}

#[test]
fn join_preserves_trigger_fields_and_order() {
    let triggers = vec![
        trigger(1, "C", T2, "rebalance", Some(5.0)),
        trigger(2, "A", T1, "withdrawal", None),
    ];
    let out = left_join(&triggers, &[]);

    assert_eq!(out.records.len(), triggers.len());
    for (joined, t) in out.records.iter().zip(&triggers) {
        assert_eq!(joined.account_canonical_id, t.account_canonical_id);
        assert_eq!(joined.run_datetime, t.run_datetime);
        assert_eq!(joined.trigger, t.trigger);
        assert_eq!(joined.tripped, t.tripped);
        assert_eq!(joined.excess_cash_amount, t.excess_cash_amount);
    }
}

/// Duplicate validation keys never multiply trigger rows; the first
/// validation row wins and a warning is raised.
#[test]
fn duplicate_validation_key_uses_first_row_and_warns() {
    let triggers = vec![trigger(1, "A", T1, "x", None)];
    let validations = vec![
        validation(1, "A", T1, Some("False"), Some("first")),
        validation(2, "A", T1, Some("True"), Some("second")),
    ];

    let out = left_join(&triggers, &validations);

    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].account_tradeable, Tradeable::False);
    assert_eq!(out.records[0].validation_category.as_deref(), Some("first"));
    assert_eq!(out.warnings.len(), 1);
    assert!(matches!(
        &out.warnings[0],
        PipelineWarning::DuplicateValidationKey { occurrences: 2, .. }
    ));
}
