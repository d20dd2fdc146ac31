use crate::types::SourceTable;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Cannot read {table} table at {path}: {source}")]
    SourceUnreadable {
        table: SourceTable,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        table: SourceTable,
        column: &'static str,
    },

    #[error("{table} table row {row}: cannot parse {column} value '{value}'")]
    InvalidValue {
        table: SourceTable,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[source] anyhow::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InsightsError {
    /// True for failures that happen while reading the input tables.
    /// These abort the run before any summary table is produced.
    pub fn is_ingest(&self) -> bool {
        matches!(
            self,
            Self::SourceUnreadable { .. }
                | Self::Csv(_)
                | Self::MissingColumn { .. }
                | Self::InvalidValue { .. }
        )
    }
}

pub type InsightsResult<T> = Result<T, InsightsError>;
