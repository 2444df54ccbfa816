//! Metrics facade
//!
//! Runs one analysis pass: chain aggregation, ATM metrics, then the
//! volatility-regime update, merged into a single [`MetricsResult`].

use chrono::{DateTime, Utc};
use observability::{AnalysisMetrics, AnalysisTimer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::atm::compute_atm_metrics;
use crate::chain::{parse_chain, OptionChainSnapshot, StrikeOi};
use crate::history::{HistoryStore, VolatilityHistory};
use crate::tracker::VolatilityTracker;
use crate::types::{ExpectedMove, Greeks, PricingParams};

/// Implied volatility quoted at one strike, points scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeIvRow {
    pub strike: f64,
    pub call_iv: Option<f64>,
    pub put_iv: Option<f64>,
}

/// Result of one analysis pass.
///
/// Every metric is optional; `None` (JSON `null`) means the metric was not
/// available this round and is never a stand-in for zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub symbol: String,
    pub computed_at: DateTime<Utc>,
    pub spot: Option<f64>,
    pub vix: Option<f64>,

    #[serde(rename = "pcr")]
    pub put_call_ratio: Option<f64>,
    #[serde(rename = "max_pain")]
    pub max_pain_strike: Option<f64>,
    pub total_call_oi: u64,
    pub total_put_oi: u64,

    pub atm_strike: Option<f64>,
    /// Fraction, e.g. 0.15 = 15%
    pub atm_iv: Option<f64>,
    pub expected_move_1d: Option<ExpectedMove>,
    pub expected_move_3d: Option<ExpectedMove>,
    pub atm_greeks: Option<Greeks>,

    pub vix_rank: Option<f64>,
    pub vix_percentile: Option<f64>,
    pub atm_iv_rank: Option<f64>,
    pub atm_iv_percentile: Option<f64>,

    pub strike_iv: Vec<StrikeIvRow>,
    pub top_oi: Vec<StrikeOi>,
}

/// Orchestrates the analytics components against a shared history store.
pub struct MetricsEngine {
    tracker: VolatilityTracker,
    params: PricingParams,
    metrics: AnalysisMetrics,
}

impl MetricsEngine {
    pub fn new(store: Arc<dyn HistoryStore>, params: PricingParams) -> Self {
        Self::from_tracker(VolatilityTracker::new(store), params)
    }

    pub fn from_tracker(tracker: VolatilityTracker, params: PricingParams) -> Self {
        Self {
            tracker,
            params,
            metrics: AnalysisMetrics::new(),
        }
    }

    /// Analysis pass with the engine's configured pricing parameters
    pub async fn compute(
        &self,
        symbol: &str,
        spot: Option<f64>,
        vix: Option<f64>,
        chain: Option<&OptionChainSnapshot>,
    ) -> MetricsResult {
        let params = self.params;
        self.compute_core_metrics(symbol, spot, vix, chain, &params).await
    }

    /// Analysis pass with explicit pricing parameters.
    ///
    /// Mutates the history store exactly once.
    pub async fn compute_core_metrics(
        &self,
        symbol: &str,
        spot: Option<f64>,
        vix: Option<f64>,
        chain: Option<&OptionChainSnapshot>,
        params: &PricingParams,
    ) -> MetricsResult {
        let _timer = AnalysisTimer::new(&self.metrics, symbol);

        let spot = spot.filter(|s| s.is_finite());
        let vix = vix.filter(|v| v.is_finite());

        if let Some(snapshot) = chain {
            self.metrics.chain_rows_skipped(snapshot.skipped_rows);
            self.metrics.chain_legs_malformed(snapshot.malformed_legs);
        }

        let aggregate = parse_chain(chain);
        debug!(
            symbol = %symbol,
            strikes = aggregate.strike_iv_table.len(),
            pcr = ?aggregate.put_call_ratio,
            max_pain = ?aggregate.max_pain_strike,
            "Chain aggregated"
        );

        let atm = compute_atm_metrics(spot, &aggregate.strike_iv_table, params);
        debug!(
            symbol = %symbol,
            atm_strike = ?atm.atm_strike,
            atm_iv = ?atm.atm_iv,
            "ATM metrics computed"
        );

        let ranks = self.tracker.update_and_rank(vix, atm.atm_iv).await;

        let strike_iv = aggregate
            .strike_iv_table
            .iter()
            .map(|(strike, iv)| StrikeIvRow {
                strike: strike.into_inner(),
                call_iv: iv.call,
                put_iv: iv.put,
            })
            .collect();

        let result = MetricsResult {
            symbol: symbol.to_string(),
            computed_at: Utc::now(),
            spot,
            vix,
            put_call_ratio: aggregate.put_call_ratio,
            max_pain_strike: aggregate.max_pain_strike,
            total_call_oi: aggregate.total_call_oi,
            total_put_oi: aggregate.total_put_oi,
            atm_strike: atm.atm_strike,
            atm_iv: atm.atm_iv,
            expected_move_1d: atm.expected_move_1d,
            expected_move_3d: atm.expected_move_3d,
            atm_greeks: atm.atm_greeks,
            vix_rank: ranks.vix.map(|r| r.rank),
            vix_percentile: ranks.vix.map(|r| r.percentile),
            atm_iv_rank: ranks.atm_iv.map(|r| r.rank),
            atm_iv_percentile: ranks.atm_iv.map(|r| r.percentile),
            strike_iv,
            top_oi: aggregate.top_oi_strikes,
        };

        info!(
            symbol = %symbol,
            pcr = ?result.put_call_ratio,
            atm_iv = ?result.atm_iv,
            atm_iv_rank = ?result.atm_iv_rank,
            vix_rank = ?result.vix_rank,
            "Analysis complete"
        );

        result
    }

    /// Persisted history, read without modification
    pub async fn history(&self) -> crate::Result<VolatilityHistory> {
        Ok(self.tracker.snapshot().await?)
    }
}
