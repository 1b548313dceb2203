//! Season and time-of-use classification of individual readings.
//!
//! Seasons are decided by comparing `(month, day)` pairs lexicographically
//! against the summer bounds, not by calendar arithmetic: a day value is
//! compared independent of the month's real length.

use std::ops::RangeInclusive;

use chrono::{NaiveTime, Timelike};

use super::types::{DemandBucket, EnergyBucket, Season};

/// First `(month, day)` of summer, inclusive.
pub const SUMMER_START: (u32, u32) = (6, 1);
/// Last `(month, day)` of summer, inclusive.
pub const SUMMER_END: (u32, u32) = (9, 30);

/// Months in which the winter super-off-peak window applies.
pub const SUPER_OFF_PEAK_MONTHS: RangeInclusive<u32> = 3..=5;

/// Half-open wall-clock window `[start, end)` at minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouWindow {
    start_minute: u32,
    end_minute: u32,
}

impl TouWindow {
    /// Window between two whole hours.
    pub const fn hours(start: u32, end: u32) -> Self {
        Self {
            start_minute: start * 60,
            end_minute: end * 60,
        }
    }

    /// Returns `true` when `start <= t < end`.
    pub fn contains(&self, t: NaiveTime) -> bool {
        let minute = t.hour() * 60 + t.minute();
        minute >= self.start_minute && minute < self.end_minute
    }
}

/// 16:00-21:00, both seasons.
pub const PEAK: TouWindow = TouWindow::hours(16, 21);
/// 14:00-16:00, summer only.
pub const PART_PEAK_AFTERNOON: TouWindow = TouWindow::hours(14, 16);
/// 21:00-23:00, summer only.
pub const PART_PEAK_EVENING: TouWindow = TouWindow::hours(21, 23);
/// 09:00-14:00, winter only and only in [`SUPER_OFF_PEAK_MONTHS`].
pub const SUPER_OFF_PEAK: TouWindow = TouWindow::hours(9, 14);

fn in_part_peak(t: NaiveTime) -> bool {
    PART_PEAK_AFTERNOON.contains(t) || PART_PEAK_EVENING.contains(t)
}

/// Season for a `(month, day)` pair.
pub fn season_of(month: u32, day: u32) -> Season {
    if (SUMMER_START..=SUMMER_END).contains(&(month, day)) {
        Season::Summer
    } else {
        Season::Winter
    }
}

/// Energy bucket for a reading. Every input maps to exactly one bucket.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use tou_billing::billing::classify::classify_energy;
/// use tou_billing::billing::types::EnergyBucket;
///
/// let t = NaiveTime::from_hms_opt(16, 30, 0).unwrap();
/// assert_eq!(classify_energy(6, 15, t), EnergyBucket::SummerPeak);
/// ```
pub fn classify_energy(month: u32, day: u32, time: NaiveTime) -> EnergyBucket {
    match season_of(month, day) {
        Season::Summer => {
            if PEAK.contains(time) {
                EnergyBucket::SummerPeak
            } else if in_part_peak(time) {
                EnergyBucket::SummerPartPeak
            } else {
                EnergyBucket::SummerOffPeak
            }
        }
        Season::Winter => {
            if PEAK.contains(time) {
                EnergyBucket::WinterPeak
            } else if SUPER_OFF_PEAK_MONTHS.contains(&month) && SUPER_OFF_PEAK.contains(time) {
                EnergyBucket::WinterSuperOffPeak
            } else {
                EnergyBucket::WinterOffPeak
            }
        }
    }
}

/// Season and windowed demand bucket for a reading.
///
/// The window bucket is `None` outside the peak and part-peak windows. The
/// season's [`DemandBucket::max_demand`] bucket applies to every reading
/// regardless of the window.
pub fn classify_demand(month: u32, day: u32, time: NaiveTime) -> (Season, Option<DemandBucket>) {
    let season = season_of(month, day);
    let window = match season {
        Season::Summer if PEAK.contains(time) => Some(DemandBucket::SummerMaxPeak),
        Season::Summer if in_part_peak(time) => Some(DemandBucket::SummerMaxPartPeak),
        Season::Winter if PEAK.contains(time) => Some(DemandBucket::WinterMaxPeak),
        _ => None,
    };
    (season, window)
}
