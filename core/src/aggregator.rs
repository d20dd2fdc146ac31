//! Aggregator — the six summary tables over the joined set.
//!
//! Each table:
//!   1. Cash utilization     — mean/count of excess cash by tradeable state
//!   2. Trigger failures     — non-tradeable count, total and rate per trigger
//!   3. Timing               — record count per hour of day
//!   4. Account performance  — same aggregation as table 1
//!   5. Cash excess series   — every record with an amount, in joined order
//!   6. Validation failures  — non-tradeable count and mean cash per category
//!
//! Tables are independent of each other. Empty or all-null inputs produce
//! empty tables or undefined means, never an error.

use crate::{
    config::InsightsConfig,
    record::JoinedRecord,
    summary::{
        CashExcessPoint, SummaryTables, TimingRow, TradeableCashRow, TriggerFailureRow,
        ValidationFailureRow,
    },
    types::Tradeable,
    warning::PipelineWarning,
};
use chrono::Timelike;
use std::collections::BTreeMap;

/// Running sum of the non-null amounts in a group, in input order.
#[derive(Debug, Clone, Copy, Default)]
struct CashAccumulator {
    records: usize,
    amounts: usize,
    sum: f64,
}

impl CashAccumulator {
    fn push(&mut self, amount: Option<f64>) {
        self.records += 1;
        if let Some(v) = amount {
            self.amounts += 1;
            self.sum += v;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.amounts > 0 {
            Some(self.sum / self.amounts as f64)
        } else {
            None
        }
    }
}

/// Build all six tables. Warnings describe degraded inputs.
pub fn aggregate(joined: &[JoinedRecord], config: &InsightsConfig) -> SummaryTables {
    let mut warnings = Vec::new();
    if joined.is_empty() {
        warnings.push(PipelineWarning::EmptyJoinedSet);
    } else if joined.iter().all(|r| r.excess_cash_amount.is_none()) {
        warnings.push(PipelineWarning::NoExcessCashValues);
    }
    for warning in &warnings {
        warning.log();
    }

    let cash = cash_by_tradeable(joined);
    let tables = SummaryTables {
        account_performance: cash.clone(),
        cash_utilization: cash,
        trigger_failures: trigger_failures(
            joined,
            config.failure_rate_divisor,
            config.rate_precision,
        ),
        timing: timing_by_hour(joined),
        cash_excess: cash_excess_series(joined),
        validation_failures: validation_failures(joined),
        warnings,
    };

    log::info!(
        "aggregated {} joined row(s): {} trigger(s) with failures, {} hour bucket(s), {} cash point(s), {} validation category row(s)",
        joined.len(),
        tables.trigger_failures.len(),
        tables.timing.len(),
        tables.cash_excess.len(),
        tables.validation_failures.len(),
    );
    tables
}

/// Tables 1 and 4. Groups appear in the order FALSE, TRUE; only groups
/// present in the input are emitted.
pub fn cash_by_tradeable(joined: &[JoinedRecord]) -> Vec<TradeableCashRow> {
    let mut groups: BTreeMap<Tradeable, CashAccumulator> = BTreeMap::new();
    for r in joined {
        groups
            .entry(r.account_tradeable)
            .or_default()
            .push(r.excess_cash_amount);
    }
    groups
        .into_iter()
        .map(|(account_tradeable, acc)| TradeableCashRow {
            account_tradeable,
            mean_excess_cash: acc.mean(),
            record_count: acc.records,
            amount_count: acc.amounts,
        })
        .collect()
}

/// Table 2. One row per trigger that has at least one non-tradeable record,
/// sorted by trigger name.
///
/// `failure_rate_percentage = failed / (total / divisor) * 100`, rounded to
/// `precision` decimals, or None when the scaled total is zero.
pub fn trigger_failures(
    joined: &[JoinedRecord],
    divisor: f64,
    precision: u32,
) -> Vec<TriggerFailureRow> {
    // trigger -> (failed, total)
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in joined {
        let entry = counts.entry(r.trigger.as_str()).or_default();
        entry.1 += 1;
        if !r.account_tradeable.is_tradeable() {
            entry.0 += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, (failed, _))| *failed > 0)
        .map(|(trigger, (failed_count, total_count))| TriggerFailureRow {
            trigger: trigger.to_string(),
            failed_count,
            total_count,
            failure_rate_percentage: failure_rate(failed_count, total_count, divisor, precision),
        })
        .collect()
}

pub fn failure_rate(failed: usize, total: usize, divisor: f64, precision: u32) -> Option<f64> {
    let scaled_total = total as f64 / divisor;
    if !(scaled_total.is_finite() && scaled_total > 0.0) {
        return None;
    }
    Some(round_to(failed as f64 / scaled_total * 100.0, precision))
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Table 3. Hours ascending; hours with no records are omitted.
pub fn timing_by_hour(joined: &[JoinedRecord]) -> Vec<TimingRow> {
    let mut hours: BTreeMap<u32, usize> = BTreeMap::new();
    for r in joined {
        *hours.entry(r.run_datetime.hour()).or_default() += 1;
    }
    hours
        .into_iter()
        .map(|(hour, trigger_count)| TimingRow {
            hour,
            trigger_count,
        })
        .collect()
}

/// Table 5.
pub fn cash_excess_series(joined: &[JoinedRecord]) -> Vec<CashExcessPoint> {
    joined
        .iter()
        .filter_map(|r| {
            r.excess_cash_amount.map(|excess_cash_amount| CashExcessPoint {
                run_datetime: r.run_datetime,
                excess_cash_amount,
                trigger: r.trigger.clone(),
            })
        })
        .collect()
}

/// Table 6. Records without a category do not form a group. Sorted by
/// amount count descending, then failure count descending, then category
/// name.
pub fn validation_failures(joined: &[JoinedRecord]) -> Vec<ValidationFailureRow> {
    let mut groups: BTreeMap<&str, CashAccumulator> = BTreeMap::new();
    for r in joined.iter().filter(|r| !r.account_tradeable.is_tradeable()) {
        if let Some(category) = r.validation_category.as_deref() {
            groups
                .entry(category)
                .or_default()
                .push(r.excess_cash_amount);
        }
    }
    let mut rows: Vec<ValidationFailureRow> = groups
        .into_iter()
        .map(|(category, acc)| ValidationFailureRow {
            validation_category: category.to_string(),
            failure_count: acc.records,
            amount_count: acc.amounts,
            mean_excess_cash: acc.mean(),
        })
        .collect();
    // Stable sort keeps the name order among equal counts.
    rows.sort_by(|a, b| {
        b.amount_count
            .cmp(&a.amount_count)
            .then(b.failure_count.cmp(&a.failure_count))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_rounds_to_precision() {
        assert_eq!(failure_rate(2, 3, 1.0, 2), Some(66.67));
        assert_eq!(failure_rate(1, 3, 1.0, 0), Some(33.0));
        assert_eq!(failure_rate(3, 3, 1.0, 2), Some(100.0));
    }

    #[test]
    fn zero_total_has_no_rate() {
        assert_eq!(failure_rate(0, 0, 1.0, 2), None);
    }

    #[test]
    fn divisor_scales_total() {
        // 1 failure out of 9 records, total scaled down to 1.
        assert_eq!(failure_rate(1, 9, 9.0, 2), Some(100.0));
    }
}
