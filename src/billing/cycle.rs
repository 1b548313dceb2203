//! Two-phase billing cycle model.
//!
//! An [`OpenCycle`] counts raw intervals and accumulates bucket values while
//! readings arrive. [`OpenCycle::finalize`] is the only way to obtain a
//! [`BillingCycle`]: it converts interval counts into day counts and freezes
//! the end timestamp. Charges are attached afterwards by the aggregator.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::classify::{classify_demand, classify_energy};
use super::types::{Cell, CycleKey, DemandBucket, EnergyBucket, Reading, Season};

/// Interval length assumed when it cannot be inferred (hourly data).
pub const DEFAULT_INTERVAL_MINUTES: u32 = 60;

const MINUTES_PER_DAY: u64 = 24 * 60;

/// A pair of values, one per season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerSeason<T> {
    pub summer: T,
    pub winter: T,
}

impl<T: Copy> PerSeason<T> {
    pub fn get(&self, season: Season) -> T {
        match season {
            Season::Summer => self.summer,
            Season::Winter => self.winter,
        }
    }

    pub fn get_mut(&mut self, season: Season) -> &mut T {
        match season {
            Season::Summer => &mut self.summer,
            Season::Winter => &mut self.winter,
        }
    }
}

/// Billed amounts for one cycle, each rounded to cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Charges {
    pub customer: Decimal,
    pub demand: Decimal,
    pub energy: Decimal,
    /// `customer + demand + energy`.
    pub total: Decimal,
}

/// Billing cycle still receiving readings.
#[derive(Debug, Clone)]
pub struct OpenCycle {
    key: CycleKey,
    start: NaiveDateTime,
    last: NaiveDateTime,
    last_season: Season,
    intervals: u32,
    season_intervals: PerSeason<u32>,
    energy: [Cell; EnergyBucket::COUNT],
    demand: [Cell; DemandBucket::COUNT],
}

impl OpenCycle {
    /// Opens an empty cycle starting at `first`'s timestamp.
    ///
    /// `first` is not recorded; pass it to [`OpenCycle::record`] as well.
    pub fn open(first: &Reading) -> Self {
        Self {
            key: CycleKey::from_date(first.date()),
            start: first.timestamp,
            last: first.timestamp,
            last_season: Season::Winter,
            intervals: 0,
            season_intervals: PerSeason::default(),
            energy: [Cell::default(); EnergyBucket::COUNT],
            demand: [Cell::default(); DemandBucket::COUNT],
        }
    }

    pub fn key(&self) -> CycleKey {
        self.key
    }

    /// Number of readings recorded so far.
    pub fn reading_count(&self) -> u32 {
        self.intervals
    }

    /// Classifies `reading` and folds it into the interval counters and cells.
    pub fn record(&mut self, reading: &Reading) {
        let (month, day, time) = (reading.month(), reading.day(), reading.time());

        let energy = classify_energy(month, day, time);
        self.energy[energy.index()].add(reading.usage_kwh);

        let (season, window) = classify_demand(month, day, time);
        if let Some(bucket) = window {
            self.demand[bucket.index()].raise_to(reading.peak_demand_kw);
        }
        self.demand[DemandBucket::max_demand(season).index()].raise_to(reading.peak_demand_kw);

        self.intervals += 1;
        *self.season_intervals.get_mut(season) += 1;
        self.last = reading.timestamp;
        self.last_season = season;
    }

    /// Closes the cycle, converting interval counts into day counts.
    ///
    /// `interval_minutes` is the inferred spacing between readings; zero
    /// falls back to [`DEFAULT_INTERVAL_MINUTES`]. Day counts are
    /// `intervals * interval_minutes / 1440`, floored. Billing days are at
    /// least one, and any day lost to per-season floor division goes to the
    /// season with the larger leftover, so the season days always sum to
    /// the billing days.
    pub fn finalize(self, interval_minutes: u32) -> BillingCycle {
        let minutes = u64::from(if interval_minutes == 0 {
            DEFAULT_INTERVAL_MINUTES
        } else {
            interval_minutes
        });
        let covered = |intervals: u32| u64::from(intervals) * minutes;
        let whole_days = |m: u64| u32::try_from(m / MINUTES_PER_DAY).unwrap_or(u32::MAX);

        let counted_days = whole_days(covered(self.intervals));
        if counted_days == 0 {
            debug!(
                cycle = %self.key,
                intervals = self.intervals,
                "cycle shorter than one day, billing one day"
            );
        }
        let billing_days = counted_days.max(1);

        let summer_minutes = covered(self.season_intervals.summer);
        let winter_minutes = covered(self.season_intervals.winter);
        let mut days_in_season = PerSeason {
            summer: whole_days(summer_minutes),
            winter: whole_days(winter_minutes),
        };
        let shortfall = billing_days
            .saturating_sub(days_in_season.summer.saturating_add(days_in_season.winter));
        if shortfall > 0 {
            let leftover_summer = summer_minutes % MINUTES_PER_DAY;
            let leftover_winter = winter_minutes % MINUTES_PER_DAY;
            let season = match leftover_summer.cmp(&leftover_winter) {
                Ordering::Greater => Season::Summer,
                Ordering::Less => Season::Winter,
                Ordering::Equal => self.last_season,
            };
            *days_in_season.get_mut(season) += shortfall;
            debug!(
                cycle = %self.key,
                %season,
                shortfall,
                "credited partial day to season"
            );
        }

        BillingCycle {
            key: self.key,
            start: self.start,
            end: self.last,
            billing_days,
            days_in_season,
            reading_count: self.intervals,
            energy: self.energy,
            demand: self.demand,
            charges: None,
        }
    }
}

/// A closed billing cycle.
///
/// Day counts and the end timestamp are fixed. [`BillingCycle::charges`]
/// stays `None` until the cycle is priced against a tariff.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingCycle {
    key: CycleKey,
    start: NaiveDateTime,
    end: NaiveDateTime,
    billing_days: u32,
    days_in_season: PerSeason<u32>,
    reading_count: u32,
    energy: [Cell; EnergyBucket::COUNT],
    demand: [Cell; DemandBucket::COUNT],
    charges: Option<Charges>,
}

impl BillingCycle {
    /// `MM-YYYY` lookup key derived from the start date.
    pub fn key(&self) -> CycleKey {
        self.key
    }

    /// Timestamp of the reading that opened the cycle.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Timestamp of the last reading in the cycle.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    /// Number of billed days, always >= 1.
    pub fn billing_days(&self) -> u32 {
        self.billing_days
    }

    pub fn days_in_season(&self) -> PerSeason<u32> {
        self.days_in_season
    }

    pub fn season_days(&self, season: Season) -> u32 {
        self.days_in_season.get(season)
    }

    pub fn reading_count(&self) -> u32 {
        self.reading_count
    }

    pub fn energy(&self, bucket: EnergyBucket) -> &Cell {
        &self.energy[bucket.index()]
    }

    pub fn demand(&self, bucket: DemandBucket) -> &Cell {
        &self.demand[bucket.index()]
    }

    /// Total usage across every energy bucket (kWh).
    pub fn total_usage_kwh(&self) -> Decimal {
        self.energy.iter().map(|c| c.value).sum()
    }

    /// Priced amounts, or `None` if the cycle has not been priced.
    pub fn charges(&self) -> Option<&Charges> {
        self.charges.as_ref()
    }

    pub(crate) fn energy_mut(&mut self, bucket: EnergyBucket) -> &mut Cell {
        &mut self.energy[bucket.index()]
    }

    pub(crate) fn demand_mut(&mut self, bucket: DemandBucket) -> &mut Cell {
        &mut self.demand[bucket.index()]
    }

    pub(crate) fn set_charges(&mut self, charges: Charges) {
        self.charges = Some(charges);
    }
}
