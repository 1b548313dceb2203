//! Text rendering of bills: per-cycle summaries and detailed breakdowns.

use std::fmt;
use std::io::{self, Write};

use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::billing::charges::round_money;
use crate::billing::classify::season_of;
use crate::billing::cycle::{BillingCycle, Charges};
use crate::billing::segment::BillingCycles;
use crate::billing::tariff::Tariff;
use crate::billing::types::{DemandBucket, EnergyBucket, Season};

const DATE_FORMAT: &str = "%m-%d-%Y";
const RULE: &str = "  ------------------------------";

/// Formats `value` with `dp` decimals and comma thousands separators.
///
/// ```
/// use rust_decimal::dec;
/// use tou_billing::report::group_thousands;
///
/// assert_eq!(group_thousands(dec!(1234567.8912), 2), "1,234,567.89");
/// assert_eq!(group_thousands(dec!(0.5), 3), "0.500");
/// ```
pub fn group_thousands(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", dp as usize, rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut out = String::with_capacity(text.len() + whole.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Dollar amount with cents and thousands separators, e.g. `$1,789.06`.
pub fn format_money(amount: Decimal) -> String {
    format!("${}", group_thousands(amount, 2))
}

/// One-cycle summary: period, day count and the four charge totals.
pub struct BillSummary<'a> {
    cycle: &'a BillingCycle,
}

impl<'a> BillSummary<'a> {
    pub fn new(cycle: &'a BillingCycle) -> Self {
        Self { cycle }
    }
}

impl fmt::Display for BillSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.cycle;
        let charges = c.charges().copied().unwrap_or_default();
        writeln!(
            f,
            "Bill for: {} to {} ({} billing day(s))",
            c.start_date().format(DATE_FORMAT),
            c.end_date().format(DATE_FORMAT),
            c.billing_days()
        )?;
        writeln!(f, "  Customer Charge: {}", format_money(charges.customer))?;
        writeln!(f, "  Demand Charge: {}", format_money(charges.demand))?;
        writeln!(f, "  Energy Charge: {}", format_money(charges.energy))?;
        writeln!(f, "{RULE}")?;
        write!(f, "  Total Charge: {}", format_money(charges.total))
    }
}

/// Detailed breakdown of one cycle, one section per season it covers.
///
/// The tariff must be the one the cycle was priced with; it supplies the
/// rates shown next to each line item.
pub struct BillDetail<'a> {
    cycle: &'a BillingCycle,
    tariff: &'a Tariff,
}

impl<'a> BillDetail<'a> {
    pub fn new(cycle: &'a BillingCycle, tariff: &'a Tariff) -> Self {
        Self { cycle, tariff }
    }

    /// Seasons with at least one day in the cycle, starting with the
    /// season the cycle opens in.
    fn seasons(&self) -> Vec<Season> {
        let start = self.cycle.start_date();
        let first = season_of(start.month(), start.day());
        let second = match first {
            Season::Summer => Season::Winter,
            Season::Winter => Season::Summer,
        };
        [first, second]
            .into_iter()
            .filter(|&s| self.cycle.season_days(s) > 0)
            .collect()
    }

    /// Customer charge attributed to `season` by its share of billing days.
    fn customer_share(&self, charges: &Charges, season: Season) -> Decimal {
        let billing_days = Decimal::from(self.cycle.billing_days().max(1));
        let season_days = Decimal::from(self.cycle.season_days(season));
        round_money(charges.customer / billing_days * season_days)
    }

    fn write_season(
        &self,
        f: &mut fmt::Formatter<'_>,
        charges: &Charges,
        season: Season,
    ) -> fmt::Result {
        const INDENT: &str = "    ";
        let c = self.cycle;
        let days = c.season_days(season);
        let name = season.label();

        writeln!(f, "  {name} Rates")?;
        writeln!(f, "  > Customer Charge:")?;
        writeln!(
            f,
            "{INDENT}{days} days @ ${} per day -> {}",
            group_thousands(self.tariff.customer_per_day, 5),
            format_money(self.customer_share(charges, season))
        )?;

        writeln!(f, "  > Demand Charge:")?;
        let mut demand_total = Decimal::ZERO;
        for bucket in DemandBucket::in_season(season) {
            let cell = c.demand(bucket);
            let cost = cell.cost().unwrap_or_default();
            demand_total += cost;
            writeln!(
                f,
                "{INDENT}{}: {} kW @ ${} per kW for {days} {season} days / {} billing days -> {}",
                bucket.period().label(),
                group_thousands(cell.value, 6),
                group_thousands(self.tariff.demand_rate(bucket), 5),
                c.billing_days(),
                format_money(cost)
            )?;
        }
        writeln!(
            f,
            "{INDENT}Total {name} Demand Charge: {}",
            format_money(demand_total)
        )?;

        writeln!(f, "  > Energy Charge:")?;
        let mut energy_total = Decimal::ZERO;
        for bucket in EnergyBucket::in_season(season) {
            let cell = c.energy(bucket);
            let cost = cell.cost().unwrap_or_default();
            energy_total += cost;
            writeln!(
                f,
                "{INDENT}{}: {} kWh @ ${} per kWh -> {}",
                bucket.period().label(),
                group_thousands(cell.value, 6),
                group_thousands(self.tariff.energy_rate(bucket), 5),
                format_money(cost)
            )?;
        }
        writeln!(
            f,
            "{INDENT}Total {name} Energy Charge: {}",
            format_money(energy_total)
        )
    }
}

impl fmt::Display for BillDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.cycle;
        let charges = c.charges().copied().unwrap_or_default();
        let days = c.days_in_season();

        writeln!(f, "  Start Date: {}", c.start_date().format(DATE_FORMAT))?;
        writeln!(f, "  End Date: {}", c.end_date().format(DATE_FORMAT))?;
        writeln!(
            f,
            "  Billing Days: {} days (Summer Days: {}, Winter Days: {})",
            c.billing_days(),
            days.summer,
            days.winter
        )?;
        writeln!(f)?;
        writeln!(f, "  Billing Breakdown:")?;
        writeln!(f)?;
        for season in self.seasons() {
            self.write_season(f, &charges, season)?;
        }
        writeln!(f, "{RULE}")?;
        write!(f, "  Total Charge: {}", format_money(charges.total))
    }
}

/// Writes a summary for every cycle in chronological order.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summaries(cycles: &BillingCycles, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "* * * * * Monthly Bill Details * * * * *")?;
    writeln!(out)?;
    for cycle in cycles {
        writeln!(out, "{}", BillSummary::new(cycle))?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the detailed breakdown of one cycle.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_detail(cycle: &BillingCycle, tariff: &Tariff, mut out: impl Write) -> io::Result<()> {
    writeln!(out, "* * * * * Detailed Bill Information * * * * *")?;
    writeln!(out)?;
    writeln!(out, "{}", BillDetail::new(cycle, tariff))?;
    writeln!(out)?;
    Ok(())
}
