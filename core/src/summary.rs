//! The six summary tables and the identifier used to select one.
//!
//! Tables are plain derived data. They are built once per run by the
//! aggregator and only read afterwards.

use crate::{
    types::{RunDateTime, Tradeable},
    warning::PipelineWarning,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ── Rows ─────────────────────────────────────────────────────────────────────

/// Tables 1 and 4: excess cash grouped by tradeable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeableCashRow {
    pub account_tradeable: Tradeable,
    /// Mean over non-null amounts. None when the group has none.
    pub mean_excess_cash: Option<f64>,
    pub record_count: usize,
    pub amount_count: usize,
}

/// Table 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerFailureRow {
    pub trigger: String,
    pub failed_count: usize,
    pub total_count: usize,
    /// None when the (scaled) total is zero.
    pub failure_rate_percentage: Option<f64>,
}

/// Table 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingRow {
    pub hour: u32,
    pub trigger_count: usize,
}

/// Table 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashExcessPoint {
    pub run_datetime: RunDateTime,
    pub excess_cash_amount: f64,
    pub trigger: String,
}

/// Table 6. `failure_count` counts non-tradeable records in the category;
/// `amount_count` counts those with an excess cash amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailureRow {
    pub validation_category: String,
    pub failure_count: usize,
    pub amount_count: usize,
    pub mean_excess_cash: Option<f64>,
}

// ── Tables ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTables {
    pub cash_utilization: Vec<TradeableCashRow>,
    pub trigger_failures: Vec<TriggerFailureRow>,
    pub timing: Vec<TimingRow>,
    pub account_performance: Vec<TradeableCashRow>,
    pub cash_excess: Vec<CashExcessPoint>,
    pub validation_failures: Vec<ValidationFailureRow>,
    pub warnings: Vec<PipelineWarning>,
}

/// Borrowed view of one table, selected by [`TableId`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum TableView<'a> {
    CashUtilization(&'a [TradeableCashRow]),
    TriggerFailures(&'a [TriggerFailureRow]),
    Timing(&'a [TimingRow]),
    AccountPerformance(&'a [TradeableCashRow]),
    CashExcess(&'a [CashExcessPoint]),
    ValidationFailures(&'a [ValidationFailureRow]),
}

impl TableView<'_> {
    pub fn row_count(&self) -> usize {
        match self {
            Self::CashUtilization(rows) | Self::AccountPerformance(rows) => rows.len(),
            Self::TriggerFailures(rows) => rows.len(),
            Self::Timing(rows) => rows.len(),
            Self::CashExcess(rows) => rows.len(),
            Self::ValidationFailures(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

impl SummaryTables {
    pub fn view(&self, id: TableId) -> TableView<'_> {
        match id {
            TableId::Table1 => TableView::CashUtilization(&self.cash_utilization),
            TableId::Table2 => TableView::TriggerFailures(&self.trigger_failures),
            TableId::Table3 => TableView::Timing(&self.timing),
            TableId::Table4 => TableView::AccountPerformance(&self.account_performance),
            TableId::Table5 => TableView::CashExcess(&self.cash_excess),
            TableId::Table6 => TableView::ValidationFailures(&self.validation_failures),
        }
    }
}

// ── Table identifiers ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableId {
    Table1,
    Table2,
    Table3,
    Table4,
    Table5,
    Table6,
}

impl TableId {
    pub const ALL: [TableId; 6] = [
        Self::Table1,
        Self::Table2,
        Self::Table3,
        Self::Table4,
        Self::Table5,
        Self::Table6,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table1 => "table1",
            Self::Table2 => "table2",
            Self::Table3 => "table3",
            Self::Table4 => "table4",
            Self::Table5 => "table5",
            Self::Table6 => "table6",
        }
    }

    /// Menu label shown next to the selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Table1 => "Table 1: Cash Utilization",
            Self::Table2 => "Table 2: Trigger Failures",
            Self::Table3 => "Table 3: Timing Analysis",
            Self::Table4 => "Table 4: Account Performance",
            Self::Table5 => "Table 5: Future Cash Excess",
            Self::Table6 => "Table 6: Validation Failures",
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTableId(pub String);

impl fmt::Display for UnknownTableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown table '{}' (expected table1..table6)", self.0)
    }
}

impl std::error::Error for UnknownTableId {}

impl FromStr for TableId {
    type Err = UnknownTableId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| UnknownTableId(s.to_string()))
    }
}
