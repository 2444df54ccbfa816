use std::f64::consts::{PI, SQRT_2};
use crate::types::{BSInputs, Greeks, OptionType};

pub fn norm_pdf(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-0.5 * x * x).exp()
}

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

/// Returns `None` when the inputs fall outside the model's domain.
pub fn d1_d2(input: &BSInputs) -> Option<(f64, f64)> {
    if !input.is_defined() {
        return None;
    }

    let s = input.spot;
    let k = input.strike;
    let t = input.time;
    let v = input.vol;
    let r = input.rate;
    let q = input.dividend_yield;

    let vol_sqrt_t = v * t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * v * v) * t) / vol_sqrt_t;
    let d2 = d1 - vol_sqrt_t;

    Some((d1, d2))
}

/// Delta, theta and vega for a European option.
///
/// Theta here is the volatility component only,
/// `-(S e^(-qT) φ(d1) σ) / (2√T)`, without the carry and rate terms.
/// Downstream consumers size positions against this magnitude.
///
/// Undefined inputs (non-positive spot, strike, vol or time) give `None`.
pub fn black_scholes_greeks(input: BSInputs) -> Option<Greeks> {
    let (d1, _d2) = d1_d2(&input)?;
    let s = input.spot;
    let t = input.time;
    let v = input.vol;
    let q = input.dividend_yield;

    let carry = (-q * t).exp();
    let pdf = norm_pdf(d1);
    let sqrt_t = t.sqrt();

    let delta = match input.option_type {
        OptionType::Call => carry * norm_cdf(d1),
        OptionType::Put => -carry * norm_cdf(-d1),
    };

    let vega = s * carry * pdf * sqrt_t;

    let theta = -(s * carry * pdf * v) / (2.0 * sqrt_t);

    Some(Greeks { delta, theta, vega })
}

/// Positional form used by the ATM calculator.
pub fn greeks(
    spot: f64,
    strike: f64,
    rate: f64,
    dividend_yield: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> Option<Greeks> {
    black_scholes_greeks(BSInputs {
        spot,
        strike,
        time,
        vol,
        rate,
        dividend_yield,
        option_type,
    })
}
