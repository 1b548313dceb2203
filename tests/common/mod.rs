//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fmt::Write;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tou_billing::billing::{BillingCycles, Tariff, price_all, segment};
use tou_billing::config::InputConfig;
use tou_billing::io::parse_readings;

/// Header matching the default `[input]` layout.
pub const HEADER: &str = "Start Date Time,Usage,Peak Demand";

pub fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid fixture timestamp")
}

/// CSV text with `count` readings spaced `step_minutes` apart.
///
/// `row` maps each timestamp to its `(usage, demand)` field text.
pub fn csv_with(
    start: NaiveDateTime,
    count: i64,
    step_minutes: i64,
    row: impl Fn(NaiveDateTime) -> (String, String),
) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for i in 0..count {
        let t = start + Duration::minutes(step_minutes * i);
        let (usage, demand) = row(t);
        let _ = writeln!(out, "{},{usage},{demand}", t.format("%m-%d-%Y %H:%M"));
    }
    out
}

/// Hourly CSV with constant usage and demand.
pub fn hourly_csv(start: NaiveDateTime, hours: i64, usage: &str, demand: &str) -> String {
    csv_with(start, hours, 60, |_| (usage.to_string(), demand.to_string()))
}

/// Parses, segments and prices `csv` with the default layout and `tariff`.
pub fn bill_csv(csv: &str, tariff: &Tariff) -> BillingCycles {
    let readings =
        parse_readings(csv.as_bytes(), &InputConfig::default()).expect("fixture CSV parses");
    let mut cycles = segment(&readings).expect("fixture has readings");
    price_all(&mut cycles, tariff).expect("fixture prices");
    cycles
}

/// Writes `contents` to a fresh file under the cargo test scratch directory.
pub fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("tou-billing-tests");
    std::fs::create_dir_all(&dir).expect("scratch dir");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write scratch file");
    path
}
