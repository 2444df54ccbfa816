//! Rolling volatility history and its stores
//!
//! The history is a single record holding two bounded series, `vix` and
//! `atm_iv`, read and rewritten in full on every analysis pass.

mod file;
mod memory;
mod traits;

pub use file::JsonFileHistoryStore;
pub use memory::InMemoryHistoryStore;
pub use traits::*;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Default number of observations kept per series
pub const DEFAULT_WINDOW: usize = 180;

/// IV readings below this are taken to be fractions rather than points
pub const IV_FRACTION_THRESHOLD: f64 = 5.0;

/// Bring an ATM IV reading onto the 0-100 points scale.
///
/// Values below 5 are assumed to be fractional rates and are multiplied
/// by 100. This misreads a genuine sub-5-point volatility, so it lives
/// here alone and callers go through it.
pub fn normalize_iv_points(iv: f64) -> f64 {
    if iv < IV_FRACTION_THRESHOLD {
        iv * 100.0
    } else {
        iv
    }
}

/// Persisted VIX and ATM IV observations, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolatilityHistory {
    #[serde(default)]
    pub vix: Vec<f64>,
    /// ATM IV in percentage points
    #[serde(default)]
    pub atm_iv: Vec<f64>,
}

impl VolatilityHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_vix(&mut self, vix: f64) {
        self.vix.push(vix);
    }

    /// Append an ATM IV reading after normalising it to points
    pub fn push_atm_iv(&mut self, atm_iv: f64) {
        self.atm_iv.push(normalize_iv_points(atm_iv));
    }

    /// Drop the oldest observations so neither series exceeds `window`
    pub fn truncate(&mut self, window: usize) {
        trim_front(&mut self.vix, window);
        trim_front(&mut self.atm_iv, window);
    }

    pub fn is_empty(&self) -> bool {
        self.vix.is_empty() && self.atm_iv.is_empty()
    }
}

fn trim_front(series: &mut Vec<f64>, window: usize) {
    if series.len() > window {
        let excess = series.len() - window;
        series.drain(..excess);
    }
}

/// Store type selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreType {
    /// In-memory store (non-persistent)
    InMemory,
    /// JSON file store
    File(PathBuf),
}

impl StoreType {
    /// Parse a backend name; `file` requires a path
    pub fn parse(backend: &str, path: Option<PathBuf>) -> Option<Self> {
        match backend.to_lowercase().as_str() {
            "inmemory" | "in_memory" | "memory" => Some(StoreType::InMemory),
            "file" | "json" => path.map(StoreType::File),
            _ => None,
        }
    }
}

/// Create a store based on configuration
pub fn create_store(store_type: StoreType) -> Arc<dyn HistoryStore> {
    match store_type {
        StoreType::InMemory => {
            info!("Creating in-memory history store");
            Arc::new(InMemoryHistoryStore::new())
        }
        StoreType::File(path) => {
            info!(path = %path.display(), "Creating file history store");
            Arc::new(JsonFileHistoryStore::new(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_iv_points() {
        assert!((normalize_iv_points(0.15) - 15.0).abs() < 1e-9);
        assert!((normalize_iv_points(4.99) - 499.0).abs() < 1e-9);
        assert_eq!(normalize_iv_points(5.0), 5.0);
        assert_eq!(normalize_iv_points(14.2), 14.2);
    }

    #[test]
    fn test_truncate_evicts_oldest() {
        let mut history = VolatilityHistory::new();
        for i in 0..DEFAULT_WINDOW {
            history.push_vix(i as f64);
        }
        assert_eq!(history.vix.len(), DEFAULT_WINDOW);

        history.push_vix(999.0);
        history.truncate(DEFAULT_WINDOW);

        assert_eq!(history.vix.len(), DEFAULT_WINDOW);
        assert_eq!(history.vix.first(), Some(&1.0));
        assert_eq!(history.vix.last(), Some(&999.0));
    }

    #[test]
    fn test_truncate_leaves_short_series() {
        let mut history = VolatilityHistory {
            vix: vec![1.0, 2.0],
            atm_iv: vec![],
        };
        history.truncate(DEFAULT_WINDOW);
        assert_eq!(history.vix, vec![1.0, 2.0]);
    }

    #[test]
    fn test_push_atm_iv_normalises() {
        let mut history = VolatilityHistory::new();
        history.push_atm_iv(0.135);
        history.push_atm_iv(13.5);
        assert!((history.atm_iv[0] - 13.5).abs() < 1e-12);
        assert_eq!(history.atm_iv[1], 13.5);
    }

    #[test]
    fn test_schema_tolerates_missing_series() {
        let history: VolatilityHistory = serde_json::from_str(r#"{"vix": [12.5]}"#).unwrap();
        assert_eq!(history.vix, vec![12.5]);
        assert!(history.atm_iv.is_empty());

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json, serde_json::json!({"vix": [12.5], "atm_iv": []}));
    }

    #[test]
    fn test_store_type_parse() {
        assert_eq!(StoreType::parse("memory", None), Some(StoreType::InMemory));
        assert_eq!(
            StoreType::parse("file", Some(PathBuf::from("h.json"))),
            Some(StoreType::File(PathBuf::from("h.json")))
        );
        assert_eq!(StoreType::parse("file", None), None);
        assert_eq!(StoreType::parse("redis", None), None);
    }
}
