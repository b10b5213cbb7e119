//! Shared numeric helpers
//!
//! Rounding is half away from zero at one decimal place. `0.25` rounds to
//! `0.3` and `-0.25` to `-0.3`, never to the even neighbour.
//!
//! Means, percent changes and differences are computed in `Decimal` from the
//! shortest decimal form of each input, so the result does not depend on
//! summation order and midpoints like `64.15` are hit exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Round to one decimal place, half away from zero
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Decimal form of a recorded value; `None` for NaN or infinities
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64_retain(value))
}

/// Round to one decimal and return the nearest `f64` to that decimal
fn finish(value: Decimal) -> Option<f64> {
    value
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse()
        .ok()
}

/// Arithmetic mean of the recorded values, rounded to one decimal.
///
/// Returns `None` when no value is recorded. Non-finite values count as
/// not recorded.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter_map(to_decimal)
        .try_fold((Decimal::ZERO, 0u32), |(sum, count), v| {
            Some((sum.checked_add(v)?, count + 1))
        })?;

    if count == 0 {
        return None;
    }
    finish(sum.checked_div(Decimal::from(count))?)
}

/// Percent change from `previous` to `current`, rounded to one decimal.
///
/// `None` if either side is missing or `previous` is zero.
pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let curr = to_decimal(current?)?;
    let prev = to_decimal(previous?)?;
    if prev.is_zero() {
        return None;
    }
    let ratio = curr.checked_sub(prev)?.checked_div(prev)?;
    finish(ratio.checked_mul(Decimal::ONE_HUNDRED)?)
}

/// Absolute difference `current - previous`, rounded to one decimal
pub fn diff(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    finish(to_decimal(current?)?.checked_sub(to_decimal(previous?)?)?)
}
