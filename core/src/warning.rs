//! Non-fatal findings raised while the pipeline runs.
//!
//! RULE: Nothing here aborts a run. Stages record a warning, log it,
//! and continue with a well-defined result.

use crate::types::{RunKey, SourceTable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineWarning {
    // ── Normalizer ─────────────────────────────────
    /// A `tripped` value that is neither TRUE nor FALSE after trimming
    /// and upper-casing. Kept as-is. Raised only for rows kept by dedup.
    UnrecognizedTripped {
        row: usize,
        value: String,
    },

    // ── Deduplicator / Joiner ──────────────────────
    DuplicateRowsDropped {
        table: SourceTable,
        dropped: usize,
    },
    /// More than one validation row shares a join key. The first one wins.
    DuplicateValidationKey {
        account_canonical_id: String,
        run_datetime: String,
        occurrences: usize,
    },

    // ── Aggregator ─────────────────────────────────
    EmptyJoinedSet,
    NoExcessCashValues,
}

impl PipelineWarning {
    pub fn duplicate_validation_key(key: &RunKey, occurrences: usize) -> Self {
        Self::DuplicateValidationKey {
            account_canonical_id: key.account_canonical_id.clone(),
            run_datetime: key.run_datetime.to_string(),
            occurrences,
        }
    }

    /// Stable name, used in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnrecognizedTripped { .. }    => "unrecognized_tripped",
            Self::DuplicateRowsDropped { .. }   => "duplicate_rows_dropped",
            Self::DuplicateValidationKey { .. } => "duplicate_validation_key",
            Self::EmptyJoinedSet                => "empty_joined_set",
            Self::NoExcessCashValues            => "no_excess_cash_values",
        }
    }

    pub fn log(&self) {
        match self {
            Self::UnrecognizedTripped { row, value } => {
                log::warn!("trigger row {row}: unrecognized tripped value '{value}' kept as-is")
            }
            Self::DuplicateRowsDropped { table, dropped } => {
                log::info!("{table} table: dropped {dropped} duplicate row(s)")
            }
            Self::DuplicateValidationKey {
                account_canonical_id,
                run_datetime,
                occurrences,
            } => log::warn!(
                "validation key ({account_canonical_id}, {run_datetime}) appears {occurrences} times; using the first"
            ),
            Self::EmptyJoinedSet => log::warn!("joined set is empty; all summary tables are empty"),
            Self::NoExcessCashValues => {
                log::warn!("no excess_cash_amount values present; cash means are undefined")
            }
        }
    }
}
