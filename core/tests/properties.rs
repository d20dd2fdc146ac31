//! Invariants checked over many seeded synthetic inputs.
//!
//! Every seed produces different duplicates, unmatched keys, null amounts
//! and odd `tripped` values. The invariants must hold for all of them.

use insights_core::{
    aggregator::{cash_by_tradeable, trigger_failures},
    dedup::dedup_triggers,
    join::left_join,
    loader::{read_triggers, read_validations},
    normalizer::normalize_triggers,
    record::{TriggerRecord, ValidationRecord},
    synth::{generate, SynthParams},
    types::Tradeable,
};
use std::collections::HashSet;

const SEEDS: std::ops::Range<u64> = 0..40;

fn load(seed: u64, rows: usize) -> (Vec<TriggerRecord>, Vec<ValidationRecord>) {
    let tables = generate(seed, &SynthParams::with_rows(rows)).expect("generate");
    let raw = read_triggers(tables.trigger_csv.as_bytes(), b',').expect("triggers");
    let validations = read_validations(tables.validation_csv.as_bytes(), b',').expect("validations");
    (normalize_triggers(&raw), validations)
}

#[test]
fn dedup_is_idempotent_and_keys_are_unique() {
    for seed in SEEDS {
        let (triggers, _) = load(seed, 120);
        let once = dedup_triggers(&triggers);
        let twice = dedup_triggers(&once);

        assert_eq!(once, twice, "seed {seed}: dedup not idempotent");
        assert!(once.len() <= triggers.len());

        let keys: HashSet<_> = once.iter().map(|r| r.key()).collect();
        assert_eq!(keys.len(), once.len(), "seed {seed}: duplicate key survived");
    }
}

#[test]
fn join_is_total_and_preserves_trigger_fields() {
    for seed in SEEDS {
        let (triggers, validations) = load(seed, 120);
        let deduplicated = dedup_triggers(&triggers);
        let out = left_join(&deduplicated, &validations);

        assert_eq!(out.records.len(), deduplicated.len(), "seed {seed}");
        for (j, t) in out.records.iter().zip(&deduplicated) {
            assert_eq!(j.key(), t.key());
            assert_eq!(j.trigger, t.trigger);
            assert_eq!(j.tripped, t.tripped);
            assert_eq!(j.excess_cash_amount, t.excess_cash_amount);
        }
    }
}

#[test]
fn tradeable_is_always_true_or_false_text() {
    for seed in SEEDS {
        let (triggers, validations) = load(seed, 80);
        let out = left_join(&dedup_triggers(&triggers), &validations);
        for r in &out.records {
            let text = r.account_tradeable.to_string();
            assert!(text == "TRUE" || text == "FALSE", "seed {seed}: {text}");
        }
        let json = serde_json::to_value(&out.records).expect("serialize");
        for row in json.as_array().expect("array") {
            let v = row["account_tradeable"].as_str().expect("string");
            assert!(v == "TRUE" || v == "FALSE");
        }
    }
}

#[test]
fn cash_utilization_conserves_record_count() {
    for seed in SEEDS {
        let (triggers, validations) = load(seed, 100);
        let joined = left_join(&dedup_triggers(&triggers), &validations).records;
        let total: usize = cash_by_tradeable(&joined).iter().map(|r| r.record_count).sum();
        assert_eq!(total, joined.len(), "seed {seed}");
    }
}

#[test]
fn failure_rates_stay_within_bounds() {
    for seed in SEEDS {
        let (triggers, validations) = load(seed, 100);
        let joined = left_join(&dedup_triggers(&triggers), &validations).records;
        for row in trigger_failures(&joined, 1.0, 2) {
            assert!(row.failed_count <= row.total_count);
            let rate = row
                .failure_rate_percentage
                .expect("rows with failures have a non-zero total");
            assert!((0.0..=100.0).contains(&rate), "seed {seed}: {rate}");
        }
        let failed: usize = joined
            .iter()
            .filter(|r| r.account_tradeable == Tradeable::False)
            .count();
        let counted: usize = trigger_failures(&joined, 1.0, 2)
            .iter()
            .map(|r| r.failed_count)
            .sum();
        assert_eq!(failed, counted, "seed {seed}");
    }
}
