//! Analysis metrics
//!
//! Counters and timings for analysis passes, recorded through the
//! `metrics` facade.
//!
//! # Metrics
//!
//! * `optlens_analyses_total{symbol}` - Analysis passes completed
//! * `optlens_analysis_duration_seconds{symbol}` - Duration of a pass
//! * `optlens_chain_rows_skipped_total` - Malformed chain rows dropped
//! * `optlens_chain_legs_malformed_total` - Malformed call or put legs dropped
//! * `optlens_history_load_failures_total` - History loads that failed
//! * `optlens_history_save_failures_total` - History saves that failed

use metrics::{counter, histogram, Counter};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct AnalysisMetrics {
    chain_rows_skipped: Counter,
    chain_legs_malformed: Counter,
    history_load_failures: Counter,
    history_save_failures: Counter,
}

impl AnalysisMetrics {
    pub fn new() -> Self {
        Self {
            chain_rows_skipped: counter!("optlens_chain_rows_skipped_total"),
            chain_legs_malformed: counter!("optlens_chain_legs_malformed_total"),
            history_load_failures: counter!("optlens_history_load_failures_total"),
            history_save_failures: counter!("optlens_history_save_failures_total"),
        }
    }

    /// Record a completed analysis pass
    pub fn record_analysis(&self, symbol: &str, duration: Duration) {
        let symbol = symbol.to_string();
        counter!("optlens_analyses_total", "symbol" => symbol.clone()).increment(1);
        histogram!("optlens_analysis_duration_seconds", "symbol" => symbol)
            .record(duration.as_secs_f64());
    }

    pub fn chain_rows_skipped(&self, rows: usize) {
        if rows > 0 {
            self.chain_rows_skipped.increment(rows as u64);
        }
    }

    pub fn chain_legs_malformed(&self, legs: usize) {
        if legs > 0 {
            self.chain_legs_malformed.increment(legs as u64);
        }
    }

    pub fn history_load_failed(&self) {
        self.history_load_failures.increment(1);
    }

    pub fn history_save_failed(&self) {
        self.history_save_failures.increment(1);
    }
}

impl Default for AnalysisMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Records an analysis pass when dropped
///
/// ```ignore
/// let metrics = AnalysisMetrics::new();
/// {
///     let _timer = AnalysisTimer::new(&metrics, "NIFTY");
///     // ... run the pass ...
/// }
/// ```
pub struct AnalysisTimer<'a> {
    metrics: &'a AnalysisMetrics,
    symbol: &'a str,
    start: Instant,
}

impl<'a> AnalysisTimer<'a> {
    pub fn new(metrics: &'a AnalysisMetrics, symbol: &'a str) -> Self {
        Self {
            metrics,
            symbol,
            start: Instant::now(),
        }
    }
}

impl Drop for AnalysisTimer<'_> {
    fn drop(&mut self) {
        self.metrics.record_analysis(self.symbol, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let metrics = AnalysisMetrics::new();
        metrics.chain_rows_skipped(3);
        metrics.chain_legs_malformed(1);
        metrics.history_load_failed();
        metrics.history_save_failed();
        {
            let _timer = AnalysisTimer::new(&metrics, "NIFTY");
        }
    }
}
