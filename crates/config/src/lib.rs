use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

/// Root of `optlens.yaml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyConfig>,
}

impl AppConfig {
    pub fn analytics(&self) -> AnalyticsConfig {
        self.analytics.clone().unwrap_or_default()
    }

    pub fn history(&self) -> HistoryConfig {
        self.history.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    pub fn strategy(&self) -> StrategyConfig {
        self.strategy.clone().unwrap_or_default()
    }
}

/// Pricing inputs for the analytics core
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// Strike grid step used to locate the ATM strike
    #[serde(default = "default_strike_step")]
    pub strike_step: f64,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    /// Days to expiry used for ATM Greeks
    #[serde(default = "default_days_to_expiry")]
    pub days_to_expiry: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            strike_step: default_strike_step(),
            risk_free_rate: default_risk_free_rate(),
            dividend_yield: 0.0,
            days_to_expiry: default_days_to_expiry(),
        }
    }
}

/// Volatility history persistence
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// `file` or `memory`
    #[serde(default = "default_history_backend")]
    pub backend: String,
    #[serde(default = "default_history_path")]
    pub path: String,
    /// Observations kept per series
    #[serde(default = "default_history_window")]
    pub window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: default_history_backend(),
            path: default_history_path(),
            window: default_history_window(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `pretty`, `json` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

/// Sizing for the strategy templates
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategyConfig {
    #[serde(default = "default_capital")]
    pub capital: f64,
    /// Percent of capital at risk per template
    #[serde(default = "default_risk_pct")]
    pub risk_pct: f64,
    /// Strike offset in points when no expected move is available
    #[serde(default = "default_fallback_expected_move")]
    pub fallback_expected_move: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            capital: default_capital(),
            risk_pct: default_risk_pct(),
            fallback_expected_move: default_fallback_expected_move(),
        }
    }
}
