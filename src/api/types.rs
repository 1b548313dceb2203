//! API response types.
//!
//! Field names follow the bill export columns so JSON and CSV consumers see
//! the same vocabulary. Money and quantities serialize as decimal strings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::billing::cycle::BillingCycle;
use crate::billing::tariff::Tariff;
use crate::billing::types::{Cell, CycleKey, DemandBucket, EnergyBucket, Period, Season};

/// One cycle's dates, day counts and charge totals.
#[derive(Debug, Serialize)]
pub struct BillSummaryRecord {
    /// `MM-YYYY` key of the cycle.
    pub cycle: CycleKey,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub billing_days: u32,
    pub summer_days: u32,
    pub winter_days: u32,
    pub customer_charge: Option<Decimal>,
    pub demand_charge: Option<Decimal>,
    pub energy_charge: Option<Decimal>,
    pub total_charge: Option<Decimal>,
}

impl From<&BillingCycle> for BillSummaryRecord {
    fn from(c: &BillingCycle) -> Self {
        let charges = c.charges();
        let days = c.days_in_season();
        Self {
            cycle: c.key(),
            start_date: c.start_date(),
            end_date: c.end_date(),
            billing_days: c.billing_days(),
            summer_days: days.summer,
            winter_days: days.winter,
            customer_charge: charges.map(|x| x.customer),
            demand_charge: charges.map(|x| x.demand),
            energy_charge: charges.map(|x| x.energy),
            total_charge: charges.map(|x| x.total),
        }
    }
}

/// A single energy or demand line item.
#[derive(Debug, Serialize)]
pub struct CellRecord {
    pub season: Season,
    pub period: Period,
    /// kWh for energy, kW for demand.
    pub value: Decimal,
    /// $/kWh for energy, $/kW for demand.
    pub rate: Decimal,
    pub cost: Option<Decimal>,
}

impl CellRecord {
    fn new(season: Season, period: Period, cell: &Cell, rate: Decimal) -> Self {
        Self {
            season,
            period,
            value: cell.value,
            rate,
            cost: cell.cost(),
        }
    }
}

/// Full breakdown of one cycle, with the rates it was priced at.
#[derive(Debug, Serialize)]
pub struct BillDetailResponse {
    #[serde(flatten)]
    pub summary: BillSummaryRecord,
    /// Name of the tariff the cycle was priced with.
    pub tariff: String,
    /// $/day customer charge rate.
    pub customer_per_day: Decimal,
    /// Number of readings folded into the cycle.
    pub reading_count: u32,
    pub total_usage_kwh: Decimal,
    pub energy: Vec<CellRecord>,
    pub demand: Vec<CellRecord>,
}

impl BillDetailResponse {
    pub fn new(c: &BillingCycle, tariff: &Tariff) -> Self {
        Self {
            summary: BillSummaryRecord::from(c),
            tariff: tariff.name.clone(),
            customer_per_day: tariff.customer_per_day,
            reading_count: c.reading_count(),
            total_usage_kwh: c.total_usage_kwh(),
            energy: EnergyBucket::ALL
                .iter()
                .map(|&b| {
                    CellRecord::new(b.season(), b.period(), c.energy(b), tariff.energy_rate(b))
                })
                .collect(),
            demand: DemandBucket::ALL
                .iter()
                .map(|&b| {
                    CellRecord::new(b.season(), b.period(), c.demand(b), tariff.demand_rate(b))
                })
                .collect(),
        }
    }
}

/// Error body returned with 4xx responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
