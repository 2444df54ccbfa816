//! Strategy templates
//!
//! Three fixed option-strategy templates sized from the analysis result.
//! These are descriptive playbooks for the presentation layer; nothing
//! here prices or simulates the positions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::MetricsResult;

/// Width used when the 1-day expected move is unavailable
pub const DEFAULT_FALLBACK_MOVE: f64 = 400.0;

/// Where the strike offsets in a template came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSource {
    ExpectedMove,
    Fallback,
}

/// Maximum loss budget for a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLimit {
    /// Fixed amount of capital
    Amount(u64),
    /// Bounded by the debit paid
    Debit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTemplate {
    pub symbol: String,
    pub name: String,
    pub contracts: String,
    pub entry: String,
    pub stop_loss: String,
    pub target_1: String,
    pub target_2: String,
    pub lots: u32,
    pub risk: RiskLimit,
    /// Indicative probability of profit, percent
    pub pop_estimate_pct: u8,
    pub move_source: MoveSource,
}

/// Build the income, directional and volatility templates for `symbol`.
///
/// Strike offsets are whole points of the 1-day expected move. Risk per
/// template is `capital * risk_pct / 100`, truncated.
pub fn build_strategies(
    symbol: &str,
    metrics: &MetricsResult,
    capital: f64,
    risk_pct: f64,
    fallback_move: f64,
) -> Vec<StrategyTemplate> {
    let (em, move_source) = match metrics.expected_move_1d {
        Some(m) if m.points > 0.0 => (m.points, MoveSource::ExpectedMove),
        _ => (fallback_move, MoveSource::Fallback),
    };
    let lot_risk = (capital * risk_pct / 100.0).max(0.0) as u64;

    debug!(symbol = %symbol, em, ?move_source, lot_risk, "Building strategy templates");

    let em_pts = em as i64;
    let short_put = (0.8 * em) as i64;
    let long_put = (1.5 * em) as i64;

    vec![
        StrategyTemplate {
            symbol: symbol.to_string(),
            name: "Income — Iron Condor".to_string(),
            contracts: format!(
                "Sell (ATM-{em_pts}) PE / Sell (ATM+{em_pts}) CE; Buy farther wings"
            ),
            entry: "Net credit (limit)".to_string(),
            stop_loss: "1.5× credit or delta breach".to_string(),
            target_1: "50% credit".to_string(),
            target_2: "75% credit".to_string(),
            lots: 1,
            risk: RiskLimit::Amount(lot_risk),
            pop_estimate_pct: 62,
            move_source,
        },
        StrategyTemplate {
            symbol: symbol.to_string(),
            name: "Directional — Put Credit Spread".to_string(),
            contracts: format!("Short OTM PE near −{short_put}; Long PE −{long_put}"),
            entry: "Net credit".to_string(),
            stop_loss: "Credit × 2".to_string(),
            target_1: "50% credit".to_string(),
            target_2: "80% credit".to_string(),
            lots: 1,
            risk: RiskLimit::Amount(lot_risk),
            pop_estimate_pct: 70,
            move_source,
        },
        StrategyTemplate {
            symbol: symbol.to_string(),
            name: "Volatility — ATM Calendar (CE)".to_string(),
            contracts: "Buy next-month ATM CE / Sell weekly ATM CE".to_string(),
            entry: "Net debit".to_string(),
            stop_loss: "Debit −30%".to_string(),
            target_1: "25%".to_string(),
            target_2: "50%".to_string(),
            lots: 1,
            risk: RiskLimit::Debit,
            pop_estimate_pct: 58,
            move_source,
        },
    ]
}
