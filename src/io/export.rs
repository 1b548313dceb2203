//! CSV export of priced billing cycles.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use rust_decimal::Decimal;

use crate::billing::cycle::Charges;
use crate::billing::segment::BillingCycles;

/// Column header for the bill export.
const HEADER: &str = "cycle,start_date,end_date,billing_days,summer_days,winter_days,\
                      customer_charge,demand_charge,energy_charge,total_charge";

/// Exports one row per billing cycle to a CSV file at the given path.
///
/// Cycles are written in chronological order. Charge columns are empty for a
/// cycle that has not been priced.
///
/// # Arguments
///
/// * `cycles` - Finalized billing cycles
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(cycles: &BillingCycles, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(cycles, buf)
}

/// Writes billing cycles as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(cycles: &BillingCycles, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for cycle in cycles {
        let days = cycle.days_in_season();
        let money = |f: fn(&Charges) -> Decimal| {
            cycle
                .charges()
                .map(|c| format!("{:.2}", f(c)))
                .unwrap_or_default()
        };
        wtr.write_record(&[
            cycle.key().to_string(),
            cycle.start_date().to_string(),
            cycle.end_date().to_string(),
            cycle.billing_days().to_string(),
            days.summer.to_string(),
            days.winter.to_string(),
            money(|c| c.customer),
            money(|c| c.demand),
            money(|c| c.energy),
            money(|c| c.total),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
