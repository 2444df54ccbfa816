//! Shared types for the analytics core

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

/// Inputs for Black-Scholes Greeks
#[derive(Debug, Clone, Copy)]
pub struct BSInputs {
    /// Spot price of the underlying
    pub spot: f64,
    /// Strike price
    pub strike: f64,
    /// Time to expiry (in years)
    pub time: f64,
    /// Implied volatility (as decimal, e.g., 0.15 = 15%)
    pub vol: f64,
    /// Risk-free rate
    pub rate: f64,
    /// Continuous dividend yield
    pub dividend_yield: f64,
    /// Option type
    pub option_type: OptionType,
}

impl BSInputs {
    /// True when every input lies in the domain where the model is defined
    pub fn is_defined(&self) -> bool {
        [self.spot, self.strike, self.vol, self.time]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Option Greeks reported by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Delta: ∂V/∂S (rate of change with spot)
    pub delta: f64,
    /// Theta: volatility component of time decay
    pub theta: f64,
    /// Vega: ∂V/∂σ (sensitivity to volatility)
    pub vega: f64,
}

/// Projected move over a horizon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedMove {
    /// Move in index/stock points
    pub points: f64,
    /// Move as a percentage of spot
    pub percent: f64,
}

/// Pricing inputs shared by one analysis pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingParams {
    /// Strike grid step used to locate the ATM strike
    pub strike_step: f64,
    /// Risk-free rate (decimal, e.g. 0.07 = 7%)
    pub risk_free_rate: f64,
    /// Continuous dividend yield (decimal)
    pub dividend_yield: f64,
    /// Days to expiry for ATM Greeks (clamped to at least 1)
    pub days_to_expiry: u32,
}

impl Default for PricingParams {
    fn default() -> Self {
        Self {
            strike_step: 100.0,
            risk_free_rate: 0.07,
            dividend_yield: 0.0,
            days_to_expiry: 7,
        }
    }
}

impl PricingParams {
    /// Time to expiry in years with a one-day floor
    pub fn time_to_expiry(&self) -> f64 {
        f64::from(self.days_to_expiry.max(1)) / 365.0
    }

    /// Reject parameters that would make every derived metric meaningless
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.strike_step.is_finite() && self.strike_step > 0.0) {
            return Err(AnalyticsError::InvalidParams(format!(
                "strike_step must be positive, got {}",
                self.strike_step
            )));
        }
        if !self.risk_free_rate.is_finite() || self.risk_free_rate < 0.0 {
            return Err(AnalyticsError::InvalidParams(format!(
                "risk_free_rate must be finite and non-negative, got {}",
                self.risk_free_rate
            )));
        }
        if !(0.0..1.0).contains(&self.dividend_yield) {
            return Err(AnalyticsError::InvalidParams(format!(
                "dividend_yield must be in [0, 1), got {}",
                self.dividend_yield
            )));
        }
        Ok(())
    }
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_time_to_expiry_has_one_day_floor() {
        let params = PricingParams {
            days_to_expiry: 0,
            ..Default::default()
        };
        assert_eq!(params.time_to_expiry(), 1.0 / 365.0);
    }

    #[test]
    fn test_default_params_are_valid() {
        assert!(PricingParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_params_rejected() {
        for rate in [-0.01, f64::NAN, f64::INFINITY] {
            let params = PricingParams {
                risk_free_rate: rate,
                ..Default::default()
            };
            assert_matches!(params.validate(), Err(AnalyticsError::InvalidParams(_)));
        }

        let params = PricingParams {
            strike_step: 0.0,
            ..Default::default()
        };
        assert_matches!(params.validate(), Err(AnalyticsError::InvalidParams(_)));

        let params = PricingParams {
            dividend_yield: 1.0,
            ..Default::default()
        };
        assert_matches!(params.validate(), Err(AnalyticsError::InvalidParams(_)));
    }
}
