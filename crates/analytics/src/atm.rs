//! At-the-money metrics
//!
//! Locates the ATM strike on a fixed grid, reads its implied volatility
//! from the chain's IV table and derives expected-move bands and call-side
//! Greeks from it.

use serde::{Deserialize, Serialize};

use crate::chain::{StrikeIv, StrikeIvTable};
use crate::greeks::greeks;
use crate::types::{ExpectedMove, Greeks, OptionType, PricingParams};
use ordered_float::OrderedFloat;

/// Derived values at the ATM strike
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AtmMetrics {
    pub atm_strike: Option<f64>,
    /// ATM implied volatility as a fraction (0.15 = 15%)
    pub atm_iv: Option<f64>,
    pub expected_move_1d: Option<ExpectedMove>,
    pub expected_move_3d: Option<ExpectedMove>,
    /// Call-side Greeks at the ATM strike
    pub atm_greeks: Option<Greeks>,
}

/// Spot rounded to the nearest multiple of `step`
pub fn atm_strike(spot: f64, step: f64) -> Option<f64> {
    if !(spot.is_finite() && spot > 0.0 && step.is_finite() && step > 0.0) {
        return None;
    }
    Some((spot / step).round() * step)
}

/// Mean of the quoted IVs at `strike`, converted from points to a fraction
pub fn atm_iv(table: &StrikeIvTable, strike: f64) -> Option<f64> {
    table
        .get(&OrderedFloat(strike))
        .and_then(StrikeIv::mean)
        .map(|points| points / 100.0)
}

/// `spot * iv * sqrt(days / 365)` in points and as a percentage of spot
pub fn expected_move(spot: Option<f64>, iv: Option<f64>, days: f64) -> Option<ExpectedMove> {
    let spot = spot.filter(|s| s.is_finite() && *s > 0.0)?;
    let iv = iv.filter(|v| v.is_finite() && *v > 0.0)?;
    if days.is_nan() || days <= 0.0 {
        return None;
    }

    let points = spot * iv * (days / 365.0).sqrt();
    Some(ExpectedMove {
        points,
        percent: points / spot * 100.0,
    })
}

pub fn compute_atm_metrics(
    spot: Option<f64>,
    table: &StrikeIvTable,
    params: &PricingParams,
) -> AtmMetrics {
    let Some(strike) = spot.and_then(|s| atm_strike(s, params.strike_step)) else {
        return AtmMetrics::default();
    };

    let iv = atm_iv(table, strike);

    let atm_greeks = match (spot, iv) {
        (Some(s), Some(v)) => greeks(
            s,
            strike,
            params.risk_free_rate,
            params.dividend_yield,
            v,
            params.time_to_expiry(),
            OptionType::Call,
        ),
        _ => None,
    };

    AtmMetrics {
        atm_strike: Some(strike),
        atm_iv: iv,
        expected_move_1d: expected_move(spot, iv, 1.0),
        expected_move_3d: expected_move(spot, iv, 3.0),
        atm_greeks,
    }
}
