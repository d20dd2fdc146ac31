//! Left join of deduplicated triggers with validation outcomes.

use crate::{
    normalizer::normalize_tradeable,
    record::{JoinedRecord, TriggerRecord, ValidationRecord},
    types::RunKey,
    warning::PipelineWarning,
};
use std::collections::{hash_map::Entry, HashMap};

#[derive(Debug, Clone, Default)]
pub struct JoinOutput {
    pub records: Vec<JoinedRecord>,
    pub warnings: Vec<PipelineWarning>,
}

/// Every trigger row appears exactly once, in input order. A validation key
/// seen more than once resolves to its first row and raises a warning.
pub fn left_join(triggers: &[TriggerRecord], validations: &[ValidationRecord]) -> JoinOutput {
    let mut index: HashMap<RunKey, (&ValidationRecord, usize)> =
        HashMap::with_capacity(validations.len());
    // Source order of first occurrences, so warnings come out deterministically.
    let mut first_seen: Vec<RunKey> = Vec::new();
    for v in validations {
        match index.entry(v.key()) {
            Entry::Occupied(mut e) => e.get_mut().1 += 1,
            Entry::Vacant(e) => {
                first_seen.push(e.key().clone());
                e.insert((v, 1));
            }
        }
    }

    let mut warnings = Vec::new();
    for key in &first_seen {
        if let Some((_, occurrences)) = index.get(key) {
            if *occurrences > 1 {
                let warning = PipelineWarning::duplicate_validation_key(key, *occurrences);
                warning.log();
                warnings.push(warning);
            }
        }
    }

    let mut matched = 0usize;
    let records: Vec<JoinedRecord> = triggers
        .iter()
        .map(|t| {
            let validation = index.get(&t.key()).map(|(v, _)| *v);
            if validation.is_some() {
                matched += 1;
            }
            JoinedRecord {
                account_canonical_id: t.account_canonical_id.clone(),
                run_datetime: t.run_datetime,
                trigger: t.trigger.clone(),
                tripped: t.tripped.clone(),
                excess_cash_amount: t.excess_cash_amount,
                account_tradeable: normalize_tradeable(
                    validation.and_then(|v| v.account_tradeable.as_deref()),
                ),
                validation_category: validation.and_then(|v| v.validation_category.clone()),
            }
        })
        .collect();

    log::info!(
        "join: {} trigger row(s), {} with a validation match",
        records.len(),
        matched
    );
    JoinOutput { records, warnings }
}
