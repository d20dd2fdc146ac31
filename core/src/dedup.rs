//! Trigger deduplication on (account_canonical_id, run_datetime).

use crate::{record::TriggerRecord, types::RunKey};
use std::collections::HashSet;

/// Keep the first record seen for each key, in source order.
/// Idempotent: deduplicating the output again changes nothing.
pub fn dedup_triggers(records: &[TriggerRecord]) -> Vec<TriggerRecord> {
    let mut seen: HashSet<RunKey> = HashSet::with_capacity(records.len());
    let kept: Vec<TriggerRecord> = records
        .iter()
        .filter(|r| seen.insert(r.key()))
        .cloned()
        .collect();
    log::debug!(
        "dedup: kept {} of {} trigger row(s)",
        kept.len(),
        records.len()
    );
    kept
}
