//! Shared primitive types used across the entire pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable account identifier as it appears in both input tables.
pub type AccountId = String;

/// Evaluation time of a trigger or validation run.
pub type RunDateTime = NaiveDateTime;

/// The dedup and join key: one trigger evaluation per account per run time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunKey {
    pub account_canonical_id: AccountId,
    pub run_datetime: RunDateTime,
}

impl RunKey {
    pub fn new(account_canonical_id: &str, run_datetime: RunDateTime) -> Self {
        Self {
            account_canonical_id: account_canonical_id.to_string(),
            run_datetime,
        }
    }
}

/// Normalized `tripped` flag.
///
/// Values other than TRUE/FALSE are kept verbatim (trimmed, upper-cased)
/// rather than coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tripped {
    Flag(bool),
    Unrecognized(String),
}

/// Rendered `account_tradeable` value. Only ever "TRUE" or "FALSE".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tradeable {
    // Declaration order gives the group order FALSE, TRUE.
    #[serde(rename = "FALSE")]
    False,
    #[serde(rename = "TRUE")]
    True,
}

impl Tradeable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::False => "FALSE",
            Self::True => "TRUE",
        }
    }

    pub fn is_tradeable(&self) -> bool {
        matches!(self, Self::True)
    }
}

impl From<bool> for Tradeable {
    fn from(b: bool) -> Self {
        if b {
            Self::True
        } else {
            Self::False
        }
    }
}

impl fmt::Display for Tradeable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which input table a record or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    Trigger,
    Validation,
}

impl SourceTable {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Validation => "validation",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
