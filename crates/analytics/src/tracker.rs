//! Volatility-regime tracker
//!
//! Appends the current VIX and ATM IV readings to the rolling history and
//! ranks each reading against its own series:
//!
//! - rank: position within the series range, `(cur - min) / (max - min) * 100`,
//!   or `50.0` when the series is flat
//! - percentile: share of observations at or below the current reading
//!
//! Load and save failures are logged and absorbed so an analysis pass
//! always completes.

use observability::AnalysisMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::history::{
    normalize_iv_points, HistoryStore, StoreError, StoreResult, VolatilityHistory, DEFAULT_WINDOW,
};
use crate::types::round1;

/// Rank reported for a series whose observations are all equal
pub const FLAT_SERIES_RANK: f64 = 50.0;

/// Rank and percentile of a reading within its history, one decimal place
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
    pub rank: f64,
    pub percentile: f64,
}

/// Ranks for both tracked series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegimeRanks {
    pub vix: Option<RankResult>,
    /// Ranked on the points scale
    pub atm_iv: Option<RankResult>,
}

/// Rank `current` within `series`; `None` if either is missing
pub fn rank_and_percentile(series: &[f64], current: Option<f64>) -> Option<RankResult> {
    let current = current?;
    if series.is_empty() {
        return None;
    }

    let lo = series.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let rank = if hi > lo {
        (current - lo) / (hi - lo) * 100.0
    } else {
        FLAT_SERIES_RANK
    };

    let at_or_below = series.iter().filter(|v| **v <= current).count();
    let percentile = at_or_below as f64 / series.len() as f64 * 100.0;

    Some(RankResult {
        rank: round1(rank),
        percentile: round1(percentile),
    })
}

/// Owns the read-append-truncate-save cycle against a [`HistoryStore`].
///
/// Updates through one tracker are serialised; callers sharing a store
/// must share the tracker.
pub struct VolatilityTracker {
    store: Arc<dyn HistoryStore>,
    window: usize,
    update_lock: Mutex<()>,
    metrics: AnalysisMetrics,
}

impl VolatilityTracker {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self::with_window(store, DEFAULT_WINDOW)
    }

    pub fn with_window(store: Arc<dyn HistoryStore>, window: usize) -> Self {
        Self {
            store,
            window: window.max(1),
            update_lock: Mutex::new(()),
            metrics: AnalysisMetrics::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Append the current readings, rank them and persist the history.
    pub async fn update_and_rank(
        &self,
        current_vix: Option<f64>,
        current_atm_iv: Option<f64>,
    ) -> RegimeRanks {
        let _guard = self.update_lock.lock().await;

        let mut history = self.load_or_empty().await;

        let vix = current_vix.filter(|v| v.is_finite());
        let iv_points = current_atm_iv
            .filter(|v| v.is_finite())
            .map(normalize_iv_points);

        if let Some(v) = vix {
            history.push_vix(v);
        }
        if let Some(v) = iv_points {
            history.atm_iv.push(v);
        }
        history.truncate(self.window);

        let ranks = RegimeRanks {
            vix: rank_and_percentile(&history.vix, vix),
            atm_iv: rank_and_percentile(&history.atm_iv, iv_points),
        };

        if let Err(e) = self.store.save(&history).await {
            warn!(error = %e, "Failed to persist volatility history; ranks still reported");
            self.metrics.history_save_failed();
        }

        ranks
    }

    /// Current persisted history, without modifying it
    pub async fn snapshot(&self) -> StoreResult<VolatilityHistory> {
        match self.store.load().await {
            Err(StoreError::NotFound(_)) => Ok(VolatilityHistory::new()),
            other => other,
        }
    }

    async fn load_or_empty(&self) -> VolatilityHistory {
        match self.store.load().await {
            Ok(history) => history,
            Err(StoreError::NotFound(what)) => {
                debug!(store = %what, "No volatility history yet, starting empty");
                VolatilityHistory::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load volatility history, starting empty");
                self.metrics.history_load_failed();
                VolatilityHistory::new()
            }
        }
    }
}
