//! Error types for the Impact Plus engine

use thiserror::Error;

/// Errors that can occur while loading data or computing Impact Plus
#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("Required column '{column}' is missing from the input schema")]
    MissingColumn { column: String },

    #[error("Table is empty: {0}")]
    EmptyTable(String),

    #[error("League raw Impact Plus is zero, scaling factor is undefined")]
    DivisionByZero,

    #[error("League raw Impact Plus is not finite ({value}), scaling factor is undefined")]
    NonFiniteLeagueImpact { value: f64 },

    #[error("Player '{name}' not found")]
    NameNotFound { name: String },

    #[error("Row position {index} is out of range for a table of {len} rows")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue { row: usize, column: String, value: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ImpactError {
    /// Whether the caller can reasonably recover and keep going (interactive lookups)
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, ImpactError::NameNotFound { .. } | ImpactError::IndexOutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, ImpactError>;
