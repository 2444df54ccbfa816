use crate::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("analytics.strike_step must be positive, got: {0}")]
    InvalidStrikeStep(f64),

    #[error("analytics.risk_free_rate must be a finite non-negative number, got: {0}")]
    InvalidRiskFreeRate(f64),

    #[error("analytics.dividend_yield must be in [0, 1), got: {0}")]
    InvalidDividendYield(f64),

    #[error("history.window must be at least 1")]
    ZeroHistoryWindow,

    #[error("Invalid history backend: {0}. Must be one of: file, memory")]
    InvalidHistoryBackend(String),

    #[error("history.path is required for the file backend")]
    MissingHistoryPath,

    #[error("Invalid log format: {0}. Must be one of: pretty, json, compact")]
    InvalidLogFormat(String),

    #[error("strategy.capital must be positive, got: {0}")]
    InvalidCapital(f64),

    #[error("strategy.risk_pct must be in (0, 100], got: {0}")]
    InvalidRiskPct(f64),

    #[error("strategy.fallback_expected_move must be positive, got: {0}")]
    InvalidFallbackMove(f64),

    #[error("Environment variable in '{field}' is not resolved: {value}")]
    UnresolvedEnvVar { field: String, value: String },
}

#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DefaultApplied {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub defaults_applied: Vec<DefaultApplied>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            defaults_applied: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationWarning {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_default(&mut self, field: &str, value: &str) {
        self.defaults_applied.push(DefaultApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(config: &AppConfig) -> ValidationReport {
    let mut report = ValidationReport::new();

    match &config.analytics {
        Some(analytics) => validate_analytics(analytics, &mut report),
        None => report.add_default(
            "analytics",
            "strike_step=100, risk_free_rate=0.07, dividend_yield=0, days_to_expiry=7",
        ),
    }

    match &config.history {
        Some(history) => validate_history(history, &mut report),
        None => report.add_default(
            "history",
            "backend=file, path=data/iv_history.json, window=180",
        ),
    }

    match &config.logging {
        Some(logging) => validate_logging(logging, &mut report),
        None => report.add_default("logging", "format=pretty"),
    }

    match &config.strategy {
        Some(strategy) => validate_strategy(strategy, &mut report),
        None => report.add_default(
            "strategy",
            "capital=100000, risk_pct=2, fallback_expected_move=400",
        ),
    }

    report
}

fn validate_analytics(analytics: &AnalyticsConfig, report: &mut ValidationReport) {
    if !(analytics.strike_step.is_finite() && analytics.strike_step > 0.0) {
        report.add_error(ValidationError::InvalidStrikeStep(analytics.strike_step));
    }

    if !analytics.risk_free_rate.is_finite() || analytics.risk_free_rate < 0.0 {
        report.add_error(ValidationError::InvalidRiskFreeRate(analytics.risk_free_rate));
    }

    if !(0.0..1.0).contains(&analytics.dividend_yield) {
        report.add_error(ValidationError::InvalidDividendYield(analytics.dividend_yield));
    }

    if analytics.days_to_expiry == 0 {
        report.add_warning(
            "analytics.days_to_expiry",
            "days_to_expiry of 0 is treated as 1 day",
        );
    }
}

fn validate_history(history: &HistoryConfig, report: &mut ValidationReport) {
    if history.window == 0 {
        report.add_error(ValidationError::ZeroHistoryWindow);
    } else if history.window > 1000 {
        report.add_warning(
            "history.window",
            &format!("window of {} observations is unusually long", history.window),
        );
    }

    let backend = history.backend.to_lowercase();
    if !SUPPORTED_HISTORY_BACKENDS.contains(&backend.as_str()) {
        report.add_error(ValidationError::InvalidHistoryBackend(history.backend.clone()));
        return;
    }

    if backend == "file" {
        if history.path.trim().is_empty() {
            report.add_error(ValidationError::MissingHistoryPath);
        } else if has_unresolved_env_vars(&history.path) {
            report.add_error(ValidationError::UnresolvedEnvVar {
                field: "history.path".to_string(),
                value: history.path.clone(),
            });
        }
    }
}

fn validate_logging(logging: &LoggingConfig, report: &mut ValidationReport) {
    if !SUPPORTED_LOG_FORMATS.contains(&logging.format.to_lowercase().as_str()) {
        report.add_error(ValidationError::InvalidLogFormat(logging.format.clone()));
    }
}

fn validate_strategy(strategy: &StrategyConfig, report: &mut ValidationReport) {
    if !(strategy.capital.is_finite() && strategy.capital > 0.0) {
        report.add_error(ValidationError::InvalidCapital(strategy.capital));
    }

    if !(strategy.risk_pct > 0.0 && strategy.risk_pct <= 100.0) {
        report.add_error(ValidationError::InvalidRiskPct(strategy.risk_pct));
    }

    if !(strategy.fallback_expected_move.is_finite() && strategy.fallback_expected_move > 0.0) {
        report.add_error(ValidationError::InvalidFallbackMove(strategy.fallback_expected_move));
    }
}
