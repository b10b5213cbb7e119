//! Error types for the sleep diary metrics engine
//!
//! The aggregation core never fails: missing data is `None`, not an error.
//! These errors only come from the untyped boundary (parsing, configuration).

use thiserror::Error;

/// Errors raised outside the pure computation core
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to parse diary payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid diary record: {0}")]
    Validation(#[from] ValidationError),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

/// Validation failures for a single raw diary record.
///
/// `index` is the record's position in the input (0-based for arrays,
/// 1-based line number for NDJSON).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: field '{field}' is not numeric (got {value})")]
    NonNumericMeasure {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("record {index}: field '{field}' = {value} is outside {min}..={max}")]
    OutOfRange {
        index: usize,
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("record {index}: invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { index: usize, value: String },

    #[error("record {index}: field '{field}' is not an RFC 3339 timestamp (got {value})")]
    InvalidTimestamp {
        index: usize,
        field: &'static str,
        value: String,
    },
}

impl ValidationError {
    /// Position of the offending record in the input
    pub fn index(&self) -> usize {
        match self {
            ValidationError::MissingField { index, .. }
            | ValidationError::NonNumericMeasure { index, .. }
            | ValidationError::OutOfRange { index, .. }
            | ValidationError::InvalidDate { index, .. }
            | ValidationError::InvalidTimestamp { index, .. } => *index,
        }
    }
}
