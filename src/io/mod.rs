//! File input and output: meter reading ingestion and bill export.

pub mod export;
pub mod ingest;

pub use ingest::{parse_readings, read_readings};
