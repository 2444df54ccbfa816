pub const SUPPORTED_HISTORY_BACKENDS: &[&str] = &["file", "memory"];
pub const SUPPORTED_LOG_FORMATS: &[&str] = &["pretty", "json", "compact"];

pub fn default_strike_step() -> f64 {
    100.0
}

pub fn default_risk_free_rate() -> f64 {
    0.07
}

pub fn default_days_to_expiry() -> u32 {
    7
}

pub fn default_history_backend() -> String {
    "file".to_string()
}

pub fn default_history_path() -> String {
    "data/iv_history.json".to_string()
}

pub fn default_history_window() -> usize {
    180
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_capital() -> f64 {
    100_000.0
}

pub fn default_risk_pct() -> f64 {
    2.0
}

pub fn default_fallback_expected_move() -> f64 {
    400.0
}
