//! Monthly bills for time-of-use metered commercial customers.
//!
//! Interval readings are read from CSV ([`io`]), cut into billing cycles and
//! priced against a seasonal tariff ([`billing`]), then rendered as text
//! ([`report`]), CSV or JSON.

#[cfg(feature = "api")]
pub mod api;
pub mod billing;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod query;
pub mod report;

pub use error::{BillingError, Result};
