//! Billing core: classification, cycle segmentation, and rate application.

/// Charge aggregation and currency rounding.
pub mod charges;
/// Season and time-of-use classification.
pub mod classify;
pub mod cycle;
/// Reading stream to billing cycle segmentation.
pub mod segment;
pub mod tariff;
pub mod types;

pub use charges::{finalize_charges, price_all, round_money};
pub use cycle::{BillingCycle, Charges, OpenCycle, PerSeason};
pub use segment::{BillingCycles, Segmenter, segment};
pub use tariff::Tariff;
pub use types::{Cell, CycleKey, DemandBucket, EnergyBucket, Period, Reading, Season};
