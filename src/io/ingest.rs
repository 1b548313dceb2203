//! CSV ingestion of interval meter readings.
//!
//! Columns are located by header name (see [`InputConfig`]), so extra
//! columns and any column order are accepted. Line numbers in errors count
//! data rows from 1, not including the header.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, dec};
use tracing::info;

use crate::billing::types::Reading;
use crate::config::InputConfig;
use crate::error::{BillingError, Result};

/// Largest usage or demand value accepted from a single reading.
pub const MAX_QUANTITY: Decimal = dec!(1000000000000);

/// Reads every reading from the CSV file at `path`.
///
/// # Arguments
///
/// * `path` - CSV file with a header row
/// * `input` - Column names and timestamp format
///
/// # Errors
///
/// Returns [`BillingError::Io`] if the file cannot be opened, and any error
/// from [`parse_readings`].
pub fn read_readings(path: &Path, input: &InputConfig) -> Result<Vec<Reading>> {
    let file = File::open(path)?;
    let readings = parse_readings(io::BufReader::new(file), input)?;
    info!(
        path = %path.display(),
        readings = readings.len(),
        "loaded meter readings"
    );
    Ok(readings)
}

/// Parses readings from any CSV source.
///
/// Blank usage or demand fields count as zero. Readings are returned in
/// file order, including any that are out of chronological order.
///
/// # Errors
///
/// - [`BillingError::MissingColumn`] if a configured column is absent
/// - [`BillingError::NoData`] if there are no data rows
/// - [`BillingError::InvalidTimestamp`], [`BillingError::InvalidNumber`],
///   [`BillingError::NegativeValue`] or [`BillingError::OutOfRange`] for the
///   first bad field
pub fn parse_readings(reader: impl Read, input: &InputConfig) -> Result<Vec<Reading>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name.trim())
            .ok_or_else(|| BillingError::MissingColumn(name.to_string()))
    };
    let ts_idx = column(&input.timestamp_column)?;
    let usage_idx = column(&input.usage_column)?;
    let demand_idx = column(&input.demand_column)?;

    let mut readings = Vec::new();

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = i + 1;

        let raw_ts = record.get(ts_idx).unwrap_or("").trim();
        let timestamp = NaiveDateTime::parse_from_str(raw_ts, &input.timestamp_format).map_err(
            |_| BillingError::InvalidTimestamp {
                line,
                value: raw_ts.to_string(),
            },
        )?;

        let usage = parse_quantity(record.get(usage_idx), line, "usage")?;
        let demand = parse_quantity(record.get(demand_idx), line, "demand")?;

        readings.push(Reading::new(timestamp, usage, demand));
    }

    if readings.is_empty() {
        return Err(BillingError::NoData);
    }
    Ok(readings)
}

/// Parses a non-negative decimal field no larger than [`MAX_QUANTITY`];
/// missing or blank is zero.
fn parse_quantity(raw: Option<&str>, line: usize, field: &'static str) -> Result<Decimal> {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| BillingError::InvalidNumber {
            line,
            field,
            value: raw.to_string(),
        })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(BillingError::NegativeValue { line, field });
    }
    if value > MAX_QUANTITY {
        return Err(BillingError::OutOfRange {
            line,
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    const SAMPLE: &str = "\
Start Date Time,Usage,Peak Demand
01-01-2024 00:00,1.25,10.5
01-01-2024 01:00,,
01-01-2024 02:00, 0.75 ,3
";

    fn parse(csv: &str) -> Result<Vec<Reading>> {
        parse_readings(csv.as_bytes(), &InputConfig::default())
    }

    #[test]
    fn parses_default_layout() {
        let readings = parse(SAMPLE).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].usage_kwh, dec!(1.25));
        assert_eq!(readings[0].peak_demand_kw, dec!(10.5));
        assert_eq!(readings[2].timestamp.to_string(), "2024-01-01 02:00:00");
    }

    #[test]
    fn blank_fields_are_zero() {
        let readings = parse(SAMPLE).unwrap();
        assert_eq!(readings[1].usage_kwh, Decimal::ZERO);
        assert_eq!(readings[1].peak_demand_kw, Decimal::ZERO);
        assert_eq!(readings[2].usage_kwh, dec!(0.75));
    }

    #[test]
    fn columns_found_by_name_in_any_order() {
        let csv = "Meter,Peak Demand,Start Date Time,Usage\nA,4,06-15-2024 16:00,2\n";
        let readings = parse(csv).unwrap();
        assert_eq!(readings[0].usage_kwh, dec!(2));
        assert_eq!(readings[0].peak_demand_kw, dec!(4));
    }

    #[test]
    fn custom_layout() {
        let input = InputConfig {
            timestamp_column: "ts".into(),
            usage_column: "kwh".into(),
            demand_column: "kw".into(),
            timestamp_format: "%Y-%m-%dT%H:%M".into(),
        };
        let csv = "ts,kwh,kw\n2024-03-10T09:15,0.5,1.5\n";
        let readings = parse_readings(csv.as_bytes(), &input).unwrap();
        assert_eq!(readings[0].month(), 3);
        assert_eq!(readings[0].day(), 10);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = parse("Start Date Time,Usage\n01-01-2024 00:00,1\n").unwrap_err();
        assert!(matches!(err, BillingError::MissingColumn(ref c) if c == "Peak Demand"));
    }

    #[test]
    fn header_only_is_no_data() {
        let err = parse("Start Date Time,Usage,Peak Demand\n").unwrap_err();
        assert!(matches!(err, BillingError::NoData));
    }

    #[test]
    fn bad_timestamp_reports_line() {
        let csv = "Start Date Time,Usage,Peak Demand\n01-01-2024 00:00,1,1\n2024/01/01 01:00,1,1\n";
        let err = parse(csv).unwrap_err();
        assert!(matches!(
            err,
            BillingError::InvalidTimestamp { line: 2, ref value } if value == "2024/01/01 01:00"
        ));
    }

    #[test]
    fn bad_number_and_negative_value() {
        let csv = "Start Date Time,Usage,Peak Demand\n01-01-2024 00:00,abc,1\n";
        assert!(matches!(
            parse(csv).unwrap_err(),
            BillingError::InvalidNumber { line: 1, field: "usage", .. }
        ));

        let csv = "Start Date Time,Usage,Peak Demand\n01-01-2024 00:00,1,-2\n";
        assert!(matches!(
            parse(csv).unwrap_err(),
            BillingError::NegativeValue { line: 1, field: "demand" }
        ));
    }

    #[test]
    fn oversized_values_are_out_of_range() {
        let csv = "Start Date Time,Usage,Peak Demand\n\
                   06-15-2024 17:00,1,10\n\
                   06-15-2024 18:00,1,1000000000000000000000000000\n";
        assert!(matches!(
            parse(csv).unwrap_err(),
            BillingError::OutOfRange { line: 2, field: "demand", ref value }
                if value == "1000000000000000000000000000"
        ));

        let csv = "Start Date Time,Usage,Peak Demand\n06-15-2024 17:00,9e20,1\n";
        assert!(matches!(
            parse(csv).unwrap_err(),
            BillingError::OutOfRange { line: 1, field: "usage", .. }
        ));

        let csv = "Start Date Time,Usage,Peak Demand\n06-15-2024 17:00,1,1000000000000\n";
        assert_eq!(parse(csv).unwrap()[0].peak_demand_kw, MAX_QUANTITY);
    }

    #[test]
    fn out_of_order_readings_are_kept() {
        let csv = "Start Date Time,Usage,Peak Demand\n01-01-2024 05:00,1,1\n01-01-2024 04:00,2,2\n";
        let readings = parse(csv).unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[1].timestamp < readings[0].timestamp);
    }
}
