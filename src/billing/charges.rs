//! Rate application: turns a finalized cycle's bucket values into charges.
//!
//! All arithmetic is exact decimal. Each bucket cost is rounded half-up to
//! cents before it is summed, so the component totals equal the sum of the
//! line items shown on a bill.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use super::cycle::{BillingCycle, Charges};
use super::segment::BillingCycles;
use super::tariff::Tariff;
use super::types::{DemandBucket, EnergyBucket};
use crate::error::{BillingError, Result};

/// Rounds a money amount to cents, halves away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal::dec;
/// use tou_billing::billing::charges::round_money;
///
/// assert_eq!(round_money(dec!(1789.0557)), dec!(1789.06));
/// assert_eq!(round_money(dec!(0.125)), dec!(0.13));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Prices `cycle` against `tariff`, setting every cell cost and the cycle
/// totals, and returns the totals.
///
/// Costs are recomputed from the cell values on every call, so pricing an
/// already priced cycle again yields identical charges.
///
/// - customer: `customer_per_day * billing_days`
/// - demand, per bucket: `rate * max_kw * season_days / billing_days`
/// - energy, per bucket: `rate * kwh`
///
/// # Errors
///
/// Returns [`BillingError::ChargeOverflow`] if any amount leaves the decimal
/// range. The cycle's totals are left untouched in that case.
pub fn finalize_charges(cycle: &mut BillingCycle, tariff: &Tariff) -> Result<Charges> {
    let key = cycle.key();
    let overflow = || BillingError::ChargeOverflow(key.to_string());
    let billing_days = Decimal::from(cycle.billing_days().max(1));

    let customer = round_money(
        tariff
            .customer_per_day
            .checked_mul(billing_days)
            .ok_or_else(overflow)?,
    );

    let mut demand = Decimal::ZERO;
    for bucket in DemandBucket::ALL {
        let season_days = Decimal::from(cycle.season_days(bucket.season()));
        let cell = cycle.demand_mut(bucket);
        let cost = tariff
            .demand_rate(bucket)
            .checked_mul(cell.value)
            .and_then(|v| v.checked_mul(season_days))
            .and_then(|v| v.checked_div(billing_days))
            .map(round_money)
            .ok_or_else(overflow)?;
        cell.set_cost(cost);
        demand = demand.checked_add(cost).ok_or_else(overflow)?;
    }

    let mut energy = Decimal::ZERO;
    for bucket in EnergyBucket::ALL {
        let cell = cycle.energy_mut(bucket);
        let cost = tariff
            .energy_rate(bucket)
            .checked_mul(cell.value)
            .map(round_money)
            .ok_or_else(overflow)?;
        cell.set_cost(cost);
        energy = energy.checked_add(cost).ok_or_else(overflow)?;
    }

    let total = customer
        .checked_add(demand)
        .and_then(|v| v.checked_add(energy))
        .ok_or_else(overflow)?;
    let charges = Charges {
        customer,
        demand,
        energy,
        total,
    };
    debug!(
        cycle = %cycle.key(),
        total = %charges.total,
        "priced billing cycle"
    );
    cycle.set_charges(charges);
    Ok(charges)
}

/// Prices every cycle against the same tariff.
///
/// # Errors
///
/// Stops at the first cycle whose charges overflow; see [`finalize_charges`].
pub fn price_all(cycles: &mut BillingCycles, tariff: &Tariff) -> Result<()> {
    for cycle in cycles.iter_mut() {
        finalize_charges(cycle, tariff)?;
    }
    Ok(())
}
