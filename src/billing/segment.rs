//! Segmentation of an ordered reading stream into monthly billing cycles.
//!
//! A new cycle opens on the first reading whose day-of-month equals the
//! anchor day (the first reading's day), once per calendar month. Every
//! reading, including the one that opens a cycle, is recorded into the cycle
//! that is open at that moment.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::cycle::{BillingCycle, DEFAULT_INTERVAL_MINUTES, OpenCycle};
use super::types::{CycleKey, Reading};
use crate::error::{BillingError, Result};

/// Finalized cycles in chronological order, keyed by `MM-YYYY`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillingCycles {
    cycles: BTreeMap<CycleKey, BillingCycle>,
}

impl BillingCycles {
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BillingCycle> {
        self.cycles.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut BillingCycle> {
        self.cycles.values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = CycleKey> + '_ {
        self.cycles.keys().copied()
    }

    pub fn get(&self, key: &CycleKey) -> Option<&BillingCycle> {
        self.cycles.get(key)
    }

    /// Looks up a cycle by its `MM-YYYY` string.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::InvalidCycleKey`] if `key` is malformed and
    /// [`BillingError::CycleNotFound`] if no cycle starts in that month.
    pub fn lookup(&self, key: &str) -> Result<&BillingCycle> {
        let parsed: CycleKey = key.parse()?;
        self.get(&parsed)
            .ok_or_else(|| BillingError::CycleNotFound(parsed.to_string()))
    }

    fn insert(&mut self, cycle: BillingCycle) {
        self.cycles.insert(cycle.key(), cycle);
    }
}

impl<'a> IntoIterator for &'a BillingCycles {
    type Item = &'a BillingCycle;
    type IntoIter = std::collections::btree_map::Values<'a, CycleKey, BillingCycle>;

    fn into_iter(self) -> Self::IntoIter {
        self.cycles.values()
    }
}

/// Interval length in minutes implied by the gap between two consecutive
/// readings.
///
/// A non-positive gap falls back to [`DEFAULT_INTERVAL_MINUTES`].
pub fn infer_interval_minutes(previous: NaiveDateTime, next: NaiveDateTime) -> u32 {
    let delta = (next - previous).num_minutes();
    if delta <= 0 {
        warn!(
            %previous,
            %next,
            "cannot infer interval length from non-increasing timestamps, assuming hourly"
        );
        return DEFAULT_INTERVAL_MINUTES;
    }
    u32::try_from(delta).unwrap_or(u32::MAX)
}

/// Streaming segmenter: feed readings in timestamp order, then [`finish`].
///
/// [`finish`]: Segmenter::finish
#[derive(Debug, Default)]
pub struct Segmenter {
    anchor_day: Option<u32>,
    interval_minutes: Option<u32>,
    previous: Option<NaiveDateTime>,
    opened: HashSet<CycleKey>,
    current: Option<OpenCycle>,
    closed: BillingCycles,
    readings: usize,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Day-of-month that opens each cycle, once the first reading is seen.
    pub fn anchor_day(&self) -> Option<u32> {
        self.anchor_day
    }

    /// Inferred interval length, or the default before two readings arrive.
    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes.unwrap_or(DEFAULT_INTERVAL_MINUTES)
    }

    /// Records one reading, opening a new cycle first if it lands on the
    /// anchor day of a month that has no cycle yet.
    pub fn push(&mut self, reading: &Reading) {
        let anchor = *self.anchor_day.get_or_insert_with(|| reading.day());

        if let Some(previous) = self.previous {
            if reading.timestamp < previous {
                warn!(
                    %previous,
                    next = %reading.timestamp,
                    "reading is earlier than its predecessor"
                );
            }
            if self.interval_minutes.is_none() {
                let inferred = infer_interval_minutes(previous, reading.timestamp);
                debug!(interval_minutes = inferred, "inferred interval length");
                self.interval_minutes = Some(inferred);
            }
        }

        let key = CycleKey::from_date(reading.date());
        if reading.day() == anchor && self.opened.insert(key) {
            if let Some(open) = self.current.take() {
                self.close(open);
            }
            info!(cycle = %key, start = %reading.timestamp, "opening billing cycle");
            self.current = Some(OpenCycle::open(reading));
        }

        if let Some(open) = self.current.as_mut() {
            open.record(reading);
        }
        self.previous = Some(reading.timestamp);
        self.readings += 1;
    }

    /// Finalizes the last open cycle and returns every cycle.
    ///
    /// # Errors
    ///
    /// Returns [`BillingError::NoData`] if no reading was pushed.
    pub fn finish(mut self) -> Result<BillingCycles> {
        let open = self.current.take().ok_or(BillingError::NoData)?;
        self.close(open);
        info!(
            readings = self.readings,
            cycles = self.closed.len(),
            interval_minutes = self.interval_minutes(),
            "segmentation complete"
        );
        Ok(self.closed)
    }

    fn close(&mut self, open: OpenCycle) {
        let cycle = open.finalize(self.interval_minutes());
        info!(
            cycle = %cycle.key(),
            end = %cycle.end(),
            billing_days = cycle.billing_days(),
            readings = cycle.reading_count(),
            "closed billing cycle"
        );
        self.closed.insert(cycle);
    }
}

/// Segments an ordered sequence of readings into finalized cycles.
///
/// # Errors
///
/// Returns [`BillingError::NoData`] if `readings` is empty.
pub fn segment<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> Result<BillingCycles> {
    let mut segmenter = Segmenter::new();
    for reading in readings {
        segmenter.push(reading);
    }
    segmenter.finish()
}
