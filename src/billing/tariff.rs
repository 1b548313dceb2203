//! Tariff table: per-day customer charge plus seasonal energy and demand rates.

use rust_decimal::Decimal;
use rust_decimal::dec;
use serde::{Deserialize, Serialize};

use super::types::{DemandBucket, EnergyBucket};

/// Immutable rate schedule passed into the charge aggregator.
///
/// Deserializes from the `[tariff]` section of the TOML config. Rates may be
/// given as quoted strings to keep every decimal digit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tariff {
    /// Schedule name shown in reports.
    pub name: String,
    /// Customer charge per billing day ($/day).
    pub customer_per_day: Decimal,
    /// Energy rates ($/kWh).
    pub energy: EnergyRates,
    /// Demand rates ($/kW, nominally per month).
    pub demand: DemandRates,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnergyRates {
    pub summer: SummerEnergyRates,
    pub winter: WinterEnergyRates,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummerEnergyRates {
    pub peak: Decimal,
    pub part_peak: Decimal,
    pub off_peak: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WinterEnergyRates {
    pub peak: Decimal,
    pub off_peak: Decimal,
    pub super_off_peak: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandRates {
    pub summer: SummerDemandRates,
    pub winter: WinterDemandRates,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummerDemandRates {
    pub max_peak: Decimal,
    pub max_part_peak: Decimal,
    pub max_demand: Decimal,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WinterDemandRates {
    pub max_peak: Decimal,
    pub max_demand: Decimal,
}

impl Default for SummerEnergyRates {
    fn default() -> Self {
        Self {
            peak: dec!(0.21867),
            part_peak: dec!(0.16493),
            off_peak: dec!(0.12692),
        }
    }
}

impl Default for WinterEnergyRates {
    fn default() -> Self {
        Self {
            peak: dec!(0.18454),
            off_peak: dec!(0.12677),
            super_off_peak: dec!(0.04927),
        }
    }
}

impl Default for EnergyRates {
    fn default() -> Self {
        Self {
            summer: SummerEnergyRates::default(),
            winter: WinterEnergyRates::default(),
        }
    }
}

impl Default for SummerDemandRates {
    fn default() -> Self {
        Self {
            max_peak: dec!(54.17),
            max_part_peak: dec!(11.75),
            max_demand: dec!(39.22),
        }
    }
}

impl Default for WinterDemandRates {
    fn default() -> Self {
        Self {
            max_peak: dec!(3.20),
            max_demand: dec!(39.22),
        }
    }
}

impl Default for DemandRates {
    fn default() -> Self {
        Self {
            summer: SummerDemandRates::default(),
            winter: WinterDemandRates::default(),
        }
    }
}

impl Default for Tariff {
    fn default() -> Self {
        Self::b19()
    }
}

impl Tariff {
    /// Mandatory customer charge for B-19 service ($/day).
    pub const B19_MANDATORY_CUSTOMER_PER_DAY: Decimal = dec!(59.63519);
    /// Voluntary customer charge for B-19 service ($/day).
    pub const B19_VOLUNTARY_CUSTOMER_PER_DAY: Decimal = dec!(11.65358);

    /// B-19 schedule with the mandatory customer charge.
    pub fn b19() -> Self {
        Self {
            name: "B-19".to_string(),
            customer_per_day: Self::B19_MANDATORY_CUSTOMER_PER_DAY,
            energy: EnergyRates::default(),
            demand: DemandRates::default(),
        }
    }

    /// B-19 schedule with the voluntary customer charge.
    pub fn b19_voluntary() -> Self {
        Self {
            name: "B-19 (voluntary)".to_string(),
            customer_per_day: Self::B19_VOLUNTARY_CUSTOMER_PER_DAY,
            ..Self::b19()
        }
    }

    /// Rate applied to usage accumulated in `bucket` ($/kWh).
    pub fn energy_rate(&self, bucket: EnergyBucket) -> Decimal {
        let (s, w) = (&self.energy.summer, &self.energy.winter);
        match bucket {
            EnergyBucket::SummerPeak => s.peak,
            EnergyBucket::SummerPartPeak => s.part_peak,
            EnergyBucket::SummerOffPeak => s.off_peak,
            EnergyBucket::WinterPeak => w.peak,
            EnergyBucket::WinterOffPeak => w.off_peak,
            EnergyBucket::WinterSuperOffPeak => w.super_off_peak,
        }
    }

    /// Rate applied to the maximum demand recorded in `bucket` ($/kW).
    pub fn demand_rate(&self, bucket: DemandBucket) -> Decimal {
        let (s, w) = (&self.demand.summer, &self.demand.winter);
        match bucket {
            DemandBucket::SummerMaxPeak => s.max_peak,
            DemandBucket::SummerMaxPartPeak => s.max_part_peak,
            DemandBucket::SummerMaxDemand => s.max_demand,
            DemandBucket::WinterMaxPeak => w.max_peak,
            DemandBucket::WinterMaxDemand => w.max_demand,
        }
    }

    /// Every rate in the table with a dotted path, for validation.
    pub fn rates(&self) -> Vec<(String, Decimal)> {
        let mut out = vec![("customer_per_day".to_string(), self.customer_per_day)];
        out.extend(EnergyBucket::ALL.iter().map(|&b| {
            (
                format!("energy.{}.{}", b.season(), b.period().key()),
                self.energy_rate(b),
            )
        }));
        out.extend(DemandBucket::ALL.iter().map(|&b| {
            (
                format!("demand.{}.{}", b.season(), b.period().key()),
                self.demand_rate(b),
            )
        }));
        out
    }
}
