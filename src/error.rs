//! Error taxonomy for ingestion, segmentation, and cycle lookup.

use thiserror::Error;

/// Errors surfaced by the billing pipeline.
///
/// Degenerate cycles (too few samples to infer an interval length, zero
/// billing days) are recovered inside the core and never appear here.
#[derive(Debug, Error)]
pub enum BillingError {
    /// The input stream contained no readings.
    #[error("no meter readings found in input")]
    NoData,

    /// A required CSV column is absent from the header row.
    #[error("missing required column \"{0}\"")]
    MissingColumn(String),

    /// A timestamp field did not match the configured format.
    #[error("line {line}: invalid timestamp \"{value}\"")]
    InvalidTimestamp { line: usize, value: String },

    /// A usage or demand field is not a decimal number.
    #[error("line {line}: invalid {field} value \"{value}\"")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// A usage or demand field is below zero.
    #[error("line {line}: {field} must be >= 0")]
    NegativeValue { line: usize, field: &'static str },

    /// A usage or demand field is too large to bill.
    #[error("line {line}: {field} value \"{value}\" is out of range")]
    OutOfRange {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A cycle key that is not of the form `MM-YYYY`.
    #[error("invalid billing cycle key \"{0}\" (expected MM-YYYY)")]
    InvalidCycleKey(String),

    /// A well-formed cycle key with no matching cycle.
    #[error("no billing cycle found for {0}")]
    CycleNotFound(String),

    /// Pricing a cycle produced an amount outside the decimal range.
    #[error("charges for cycle {0} exceed the representable range")]
    ChargeOverflow(String),
}

pub type Result<T> = std::result::Result<T, BillingError>;
