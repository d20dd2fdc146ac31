//! Row types for every stage of the pipeline.
//!
//! Each stage consumes one of these and produces the next:
//!   RawTriggerRecord --normalize--> TriggerRecord --dedup/join--> JoinedRecord
//!   ValidationRecord ------------------------------^

use crate::types::{RunDateTime, RunKey, Tradeable, Tripped};
use serde::{Deserialize, Serialize};

/// A trigger row exactly as read, before `tripped` is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTriggerRecord {
    /// 1-based data row in the source table.
    pub row: usize,
    pub account_canonical_id: String,
    pub run_datetime: RunDateTime,
    pub trigger: String,
    pub tripped: String,
    pub excess_cash_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRecord {
    pub row: usize,
    pub account_canonical_id: String,
    pub run_datetime: RunDateTime,
    pub trigger: String,
    pub tripped: Tripped,
    pub excess_cash_amount: Option<f64>,
}

impl TriggerRecord {
    pub fn key(&self) -> RunKey {
        RunKey::new(&self.account_canonical_id, self.run_datetime)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub row: usize,
    pub account_canonical_id: String,
    pub run_datetime: RunDateTime,
    /// Raw truthy/falsy text; None when the cell is empty.
    pub account_tradeable: Option<String>,
    pub validation_category: Option<String>,
}

impl ValidationRecord {
    pub fn key(&self) -> RunKey {
        RunKey::new(&self.account_canonical_id, self.run_datetime)
    }
}

/// One deduplicated trigger row with its validation outcome attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub account_canonical_id: String,
    pub run_datetime: RunDateTime,
    pub trigger: String,
    pub tripped: Tripped,
    pub excess_cash_amount: Option<f64>,
    pub account_tradeable: Tradeable,
    /// None when no validation row matched or its category was empty.
    pub validation_category: Option<String>,
}

impl JoinedRecord {
    pub fn key(&self) -> RunKey {
        RunKey::new(&self.account_canonical_id, self.run_datetime)
    }
}
