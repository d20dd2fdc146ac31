//! Deterministic synthetic input tables.
//!
//! RULE: Nothing here may call a platform RNG. Every stream is derived from
//! one master seed, so a seed always produces byte-identical CSV text.
//!
//! Each table gets its own stream, seeded from (master_seed XOR slot), so
//! changing how validation rows are drawn never changes the trigger rows.

use crate::error::{InsightsError, InsightsResult};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::HashSet;
use std::path::Path;

pub const TRIGGER_FILE: &str = "table_trigger.csv";
pub const VALIDATION_FILE: &str = "table_validation.csv";

const TRIGGERS: [&str; 5] = ["withdrawal", "deposit", "rebalance", "cash_sweep", "tax_loss"];
const CATEGORIES: [&str; 4] = [
    "insufficient_cash",
    "restricted_account",
    "pending_trade",
    "model_drift",
];

/// A named, deterministic RNG for one synthetic table.
pub struct SynthRng {
    inner: Pcg64Mcg,
}

impl SynthRng {
    pub fn new(master_seed: u64, stream: SynthStream) -> Self {
        let derived_seed = master_seed ^ ((stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        log::debug!("synthetic {stream:?} stream seeded with {derived_seed:#x}");
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    pub fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.next_u64_below(items.len() as u64) as usize]
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Stable stream assignments. Append only: reordering changes every seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SynthStream {
    Trigger = 0,
    Validation = 1,
}

#[derive(Debug, Clone)]
pub struct SynthParams {
    pub trigger_rows: usize,
    pub accounts: usize,
    pub duplicate_rate: f64,
    pub null_amount_rate: f64,
    pub unrecognized_tripped_rate: f64,
    /// Share of unique trigger keys that get a validation row.
    pub validation_coverage: f64,
    pub duplicate_validation_rate: f64,
}

impl SynthParams {
    pub fn with_rows(trigger_rows: usize) -> Self {
        Self {
            trigger_rows,
            accounts: (trigger_rows / 4).max(1),
            duplicate_rate: 0.10,
            null_amount_rate: 0.15,
            unrecognized_tripped_rate: 0.02,
            validation_coverage: 0.85,
            duplicate_validation_rate: 0.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticTables {
    pub trigger_csv: String,
    pub validation_csv: String,
}

impl SyntheticTables {
    /// Write both tables into `dir` under their default file names.
    pub fn write_to_dir(&self, dir: &Path) -> InsightsResult<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(TRIGGER_FILE), &self.trigger_csv)?;
        std::fs::write(dir.join(VALIDATION_FILE), &self.validation_csv)?;
        log::info!("wrote synthetic tables to {}", dir.display());
        Ok(())
    }
}

pub fn generate(master_seed: u64, params: &SynthParams) -> InsightsResult<SyntheticTables> {
    let mut trig_rng = SynthRng::new(master_seed, SynthStream::Trigger);
    let mut val_rng = SynthRng::new(master_seed, SynthStream::Validation);
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow::anyhow!("invalid synthetic base date"))?;

    let mut triggers = csv::Writer::from_writer(Vec::new());
    triggers.write_record([
        "account_canonical_id",
        "run_datetime",
        "trigger",
        "tripped",
        "excess_cash_amount",
    ])?;

    let mut keys: Vec<(String, NaiveDateTime)> = Vec::new();
    let mut seen: HashSet<(String, NaiveDateTime)> = HashSet::new();
    for _ in 0..params.trigger_rows {
        let key = match keys.last() {
            Some(prev) if trig_rng.chance(params.duplicate_rate) => prev.clone(),
            _ => {
                let account = format!(
                    "ACC-{:04}",
                    trig_rng.next_u64_below(params.accounts.max(1) as u64)
                );
                let offset = Duration::days(trig_rng.next_u64_below(30) as i64)
                    + Duration::hours(trig_rng.next_u64_below(24) as i64)
                    + Duration::minutes(15 * trig_rng.next_u64_below(4) as i64);
                (account, base + offset)
            }
        };

        let tripped = if trig_rng.chance(params.unrecognized_tripped_rate) {
            "maybe"
        } else {
            trig_rng.pick(&["TRUE", "FALSE", " true", "False "])
        };
        let amount = if trig_rng.chance(params.null_amount_rate) {
            trig_rng.pick(&["", "NaN"]).to_string()
        } else {
            format!("{:.2}", trig_rng.pareto(50.0, 1.5))
        };

        let run_at = key.1.format("%Y-%m-%d %H:%M:%S").to_string();
        let trigger = trig_rng.pick(&TRIGGERS);
        triggers.write_record([key.0.as_str(), run_at.as_str(), trigger, tripped, amount.as_str()])?;

        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }

    let mut validations = csv::Writer::from_writer(Vec::new());
    validations.write_record([
        "account_canonical_id",
        "run_datetime",
        "account_tradeable",
        "validation_category",
    ])?;
    for (account, run_datetime) in &keys {
        if !val_rng.chance(params.validation_coverage) {
            continue;
        }
        let copies = if val_rng.chance(params.duplicate_validation_rate) { 2 } else { 1 };
        for _ in 0..copies {
            let tradeable = val_rng.chance(0.6);
            let raw = if tradeable {
                val_rng.pick(&["True", "TRUE", "1", "yes"])
            } else {
                val_rng.pick(&["False", "FALSE", "0", ""])
            };
            let category = if tradeable { "" } else { val_rng.pick(&CATEGORIES) };
            let run_at = run_datetime.format("%Y-%m-%d %H:%M:%S").to_string();
            validations.write_record([account.as_str(), run_at.as_str(), raw, category])?;
        }
    }

    Ok(SyntheticTables {
        trigger_csv: finish(triggers)?,
        validation_csv: finish(validations)?,
    })
}

fn finish(writer: csv::Writer<Vec<u8>>) -> InsightsResult<String> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| InsightsError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_tables() {
        let params = SynthParams::with_rows(200);
        let a = generate(7, &params).unwrap();
        let b = generate(7, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let params = SynthParams::with_rows(200);
        assert_ne!(
            generate(1, &params).unwrap().trigger_csv,
            generate(2, &params).unwrap().trigger_csv
        );
    }

    #[test]
    fn trigger_row_count_matches_params() {
        let tables = generate(11, &SynthParams::with_rows(50)).unwrap();
        // Header plus one line per row.
        assert_eq!(tables.trigger_csv.lines().count(), 51);
    }
}
