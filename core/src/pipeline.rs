//! The insights pipeline — one batch run from input tables to summaries.
//!
//! STAGE ORDER (fixed, never reordered):
//!   1. Loader        — read trigger and validation tables
//!   2. Normalizer    — canonical `tripped`
//!   3. Deduplicator  — one trigger row per (account, run time)
//!   4. Joiner        — left join with validation, tradeable rendered
//!   5. Aggregator    — the six summary tables
//!
//! RULES:
//!   - Each stage completes before the next begins.
//!   - Each stage takes its input by reference and returns a new value.
//!   - The config is validated when the pipeline is built, before any stage.
//!   - Only the Loader can fail. Later stages record warnings instead.

use crate::{
    aggregator,
    config::InsightsConfig,
    dedup::dedup_triggers,
    error::{InsightsError, InsightsResult},
    join::left_join,
    loader::{self, LoadedTables},
    normalizer::{normalize_triggers, unrecognized_tripped},
    record::JoinedRecord,
    summary::SummaryTables,
    types::SourceTable,
    warning::PipelineWarning,
};

/// Row counts per stage, for run summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StageCounts {
    pub trigger_rows: usize,
    pub validation_rows: usize,
    pub deduplicated_rows: usize,
    pub joined_rows: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub joined: Vec<JoinedRecord>,
    pub tables: SummaryTables,
    pub counts: StageCounts,
}

impl PipelineOutput {
    /// Warnings from every stage, in stage order.
    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.tables.warnings
    }
}

#[derive(Debug)]
pub struct InsightsPipeline {
    config: InsightsConfig,
}

impl InsightsPipeline {
    /// Fails on an invalid config, so no run starts with one.
    pub fn new(config: InsightsConfig) -> InsightsResult<Self> {
        config.validate().map_err(InsightsError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    /// Load the configured files and run every stage.
    pub fn run(&self) -> InsightsResult<PipelineOutput> {
        let tables = loader::load_tables(&self.config)?;
        Ok(self.run_loaded(&tables))
    }

    /// Run stages 2..5 on tables already in memory.
    pub fn run_loaded(&self, loaded: &LoadedTables) -> PipelineOutput {
        let mut warnings = Vec::new();

        let normalized = normalize_triggers(&loaded.triggers);

        let deduplicated = dedup_triggers(&normalized);
        warnings.extend(unrecognized_tripped(&deduplicated));
        let dropped = normalized.len() - deduplicated.len();
        if dropped > 0 {
            let warning = PipelineWarning::DuplicateRowsDropped {
                table: SourceTable::Trigger,
                dropped,
            };
            warning.log();
            warnings.push(warning);
        }

        let joined = left_join(&deduplicated, &loaded.validations);
        warnings.extend(joined.warnings);

        let mut tables = aggregator::aggregate(&joined.records, &self.config);
        warnings.append(&mut tables.warnings);
        tables.warnings = warnings;

        let counts = StageCounts {
            trigger_rows: loaded.triggers.len(),
            validation_rows: loaded.validations.len(),
            deduplicated_rows: deduplicated.len(),
            joined_rows: joined.records.len(),
        };
        log::info!(
            "pipeline complete: {} trigger row(s) -> {} deduplicated -> {} joined, {} warning(s)",
            counts.trigger_rows,
            counts.deduplicated_rows,
            counts.joined_rows,
            tables.warnings.len(),
        );

        PipelineOutput {
            joined: joined.records,
            tables,
            counts,
        }
    }
}
