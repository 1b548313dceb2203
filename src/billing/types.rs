//! Core billing types: meter readings, season/period buckets, and cycle keys.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::BillingError;

/// One interval sample from the meter.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::dec;
/// use tou_billing::billing::types::Reading;
///
/// let ts = NaiveDate::from_ymd_opt(2024, 6, 15)
///     .and_then(|d| d.and_hms_opt(16, 30, 0))
///     .unwrap();
/// let r = Reading::new(ts, dec!(10.0), dec!(4.2));
/// assert_eq!(r.month(), 6);
/// assert_eq!(r.day(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    /// Interval start, local wall-clock time without a zone.
    pub timestamp: NaiveDateTime,
    /// Energy used during the interval (kWh, >= 0).
    pub usage_kwh: Decimal,
    /// Peak demand observed during the interval (kW, >= 0).
    pub peak_demand_kw: Decimal,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, usage_kwh: Decimal, peak_demand_kw: Decimal) -> Self {
        Self {
            timestamp,
            usage_kwh,
            peak_demand_kw,
        }
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn day(&self) -> u32 {
        self.timestamp.day()
    }

    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Tariff season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub const ALL: [Self; 2] = [Self::Summer, Self::Winter];

    /// Human-readable name, capitalised.
    pub fn label(self) -> &'static str {
        match self {
            Self::Summer => "Summer",
            Self::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summer => f.write_str("summer"),
            Self::Winter => f.write_str("winter"),
        }
    }
}

/// Time-of-use period, covering both energy and demand buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Peak,
    PartPeak,
    OffPeak,
    SuperOffPeak,
    MaxPeak,
    MaxPartPeak,
    MaxDemand,
}

impl Period {
    /// Snake-case identifier, matching the TOML and JSON field names.
    pub fn key(self) -> &'static str {
        match self {
            Self::Peak => "peak",
            Self::PartPeak => "part_peak",
            Self::OffPeak => "off_peak",
            Self::SuperOffPeak => "super_off_peak",
            Self::MaxPeak => "max_peak",
            Self::MaxPartPeak => "max_part_peak",
            Self::MaxDemand => "max_demand",
        }
    }

    /// Label used in bill breakdowns.
    pub fn label(self) -> &'static str {
        match self {
            Self::Peak => "Peak Energy Usage",
            Self::PartPeak => "Part-Peak Energy Usage",
            Self::OffPeak => "Off-Peak Energy Usage",
            Self::SuperOffPeak => "Super Off-Peak Energy Usage",
            Self::MaxPeak => "Max Peak Demand",
            Self::MaxPartPeak => "Max Part-Peak Demand",
            Self::MaxDemand => "Max Demand",
        }
    }
}

/// Valid (season, period) combinations for energy usage.
///
/// Every reading lands in exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyBucket {
    SummerPeak,
    SummerPartPeak,
    SummerOffPeak,
    WinterPeak,
    WinterOffPeak,
    WinterSuperOffPeak,
}

impl EnergyBucket {
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::SummerPeak,
        Self::SummerPartPeak,
        Self::SummerOffPeak,
        Self::WinterPeak,
        Self::WinterOffPeak,
        Self::WinterSuperOffPeak,
    ];

    pub const fn season(self) -> Season {
        match self {
            Self::SummerPeak | Self::SummerPartPeak | Self::SummerOffPeak => Season::Summer,
            Self::WinterPeak | Self::WinterOffPeak | Self::WinterSuperOffPeak => Season::Winter,
        }
    }

    pub const fn period(self) -> Period {
        match self {
            Self::SummerPeak | Self::WinterPeak => Period::Peak,
            Self::SummerPartPeak => Period::PartPeak,
            Self::SummerOffPeak | Self::WinterOffPeak => Period::OffPeak,
            Self::WinterSuperOffPeak => Period::SuperOffPeak,
        }
    }

    /// Buckets belonging to `season`, in table order.
    pub fn in_season(season: Season) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |b| b.season() == season)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Valid (season, period) combinations for demand maxima.
///
/// Winter has no part-peak demand bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandBucket {
    SummerMaxPeak,
    SummerMaxPartPeak,
    SummerMaxDemand,
    WinterMaxPeak,
    WinterMaxDemand,
}

impl DemandBucket {
    pub const COUNT: usize = 5;

    pub const ALL: [Self; Self::COUNT] = [
        Self::SummerMaxPeak,
        Self::SummerMaxPartPeak,
        Self::SummerMaxDemand,
        Self::WinterMaxPeak,
        Self::WinterMaxDemand,
    ];

    pub const fn season(self) -> Season {
        match self {
            Self::SummerMaxPeak | Self::SummerMaxPartPeak | Self::SummerMaxDemand => {
                Season::Summer
            }
            Self::WinterMaxPeak | Self::WinterMaxDemand => Season::Winter,
        }
    }

    pub const fn period(self) -> Period {
        match self {
            Self::SummerMaxPeak | Self::WinterMaxPeak => Period::MaxPeak,
            Self::SummerMaxPartPeak => Period::MaxPartPeak,
            Self::SummerMaxDemand | Self::WinterMaxDemand => Period::MaxDemand,
        }
    }

    /// The season-wide maximum bucket, updated by every sample.
    pub const fn max_demand(season: Season) -> Self {
        match season {
            Season::Summer => Self::SummerMaxDemand,
            Season::Winter => Self::WinterMaxDemand,
        }
    }

    pub fn in_season(season: Season) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |b| b.season() == season)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Accumulated quantity for one bucket plus its priced cost.
///
/// `cost` stays `None` until the owning cycle is priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Running sum (energy) or running maximum (demand).
    pub value: Decimal,
    cost: Option<Decimal>,
}

impl Cell {
    /// Adds `amount` to the running total, saturating at [`Decimal::MAX`].
    pub fn add(&mut self, amount: Decimal) {
        self.value = self.value.saturating_add(amount);
    }

    /// Raises the running maximum to `sample` if it is larger.
    pub fn raise_to(&mut self, sample: Decimal) {
        if sample > self.value {
            self.value = sample;
        }
    }

    /// Priced cost, rounded to cents. `None` before pricing.
    pub fn cost(&self) -> Option<Decimal> {
        self.cost
    }

    pub(crate) fn set_cost(&mut self, cost: Decimal) {
        self.cost = Some(cost);
    }
}

/// External lookup key for a billing cycle: the start date's month and year.
///
/// Orders chronologically and formats as `MM-YYYY`.
///
/// # Examples
///
/// ```
/// use tou_billing::billing::types::CycleKey;
///
/// let key: CycleKey = "03-2024".parse().unwrap();
/// assert_eq!(key.month(), 3);
/// assert_eq!(key.to_string(), "03-2024");
/// assert!("2024-03".parse::<CycleKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleKey {
    year: i32,
    month: u32,
}

impl CycleKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for CycleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

impl FromStr for CycleKey {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BillingError::InvalidCycleKey(s.to_string());
        let (mm, yyyy) = s.trim().split_once('-').ok_or_else(invalid)?;
        if mm.len() != 2 || yyyy.len() != 4 {
            return Err(invalid());
        }
        if !mm.bytes().chain(yyyy.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let month: u32 = mm.parse().map_err(|_| invalid())?;
        let year: i32 = yyyy.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

impl Serialize for CycleKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn energy_table_covers_each_season_once_per_period() {
        let summer: Vec<Period> = EnergyBucket::in_season(Season::Summer)
            .map(EnergyBucket::period)
            .collect();
        let winter: Vec<Period> = EnergyBucket::in_season(Season::Winter)
            .map(EnergyBucket::period)
            .collect();
        assert_eq!(summer, vec![Period::Peak, Period::PartPeak, Period::OffPeak]);
        assert_eq!(
            winter,
            vec![Period::Peak, Period::OffPeak, Period::SuperOffPeak]
        );
    }

    #[test]
    fn winter_has_no_part_peak_demand() {
        assert!(
            DemandBucket::in_season(Season::Winter).all(|b| b.period() != Period::MaxPartPeak)
        );
        assert_eq!(DemandBucket::in_season(Season::Summer).count(), 3);
        assert_eq!(DemandBucket::in_season(Season::Winter).count(), 2);
    }

    #[test]
    fn bucket_indices_match_table_positions() {
        for (i, b) in EnergyBucket::ALL.iter().enumerate() {
            assert_eq!(b.index(), i);
        }
        for (i, b) in DemandBucket::ALL.iter().enumerate() {
            assert_eq!(b.index(), i);
        }
    }

    #[test]
    fn cell_sum_and_max() {
        let mut sum = Cell::default();
        sum.add(dec!(1.25));
        sum.add(dec!(2.50));
        assert_eq!(sum.value, dec!(3.75));

        let mut max = Cell::default();
        max.raise_to(dec!(50.0));
        max.raise_to(dec!(30.0));
        assert_eq!(max.value, dec!(50.0));
        assert_eq!(max.cost(), None);
    }

    #[test]
    fn cell_sum_saturates_instead_of_panicking() {
        let mut sum = Cell::default();
        sum.add(Decimal::MAX);
        sum.add(Decimal::MAX);
        assert_eq!(sum.value, Decimal::MAX);
    }

    #[test]
    fn cycle_key_orders_by_year_then_month() {
        let dec_2023: CycleKey = "12-2023".parse().unwrap();
        let jan_2024: CycleKey = "01-2024".parse().unwrap();
        assert!(dec_2023 < jan_2024);
    }

    #[test]
    fn cycle_key_rejects_malformed_input() {
        for bad in ["1-2024", "13-2024", "00-2024", "ab-2024", "01/2024", "01-24", ""] {
            assert!(bad.parse::<CycleKey>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn cycle_key_from_date_pads_month() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(CycleKey::from_date(date).to_string(), "07-2024");
    }
}
