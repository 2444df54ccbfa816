//! Option-Chain Analytics for OptionLens
//!
//! This crate turns a raw option-chain snapshot plus a spot price and a
//! volatility-index level into derived risk metrics, and keeps a rolling
//! history used to rank the current volatility regime.
//!
//! # Core Components
//!
//! - [`greeks`] - Black-Scholes delta, theta and vega
//! - [`chain`] - Option-chain aggregation (PCR, max pain, IV table, top OI)
//! - [`atm`] - At-the-money strike, IV, expected moves and Greeks
//! - [`history`] - Rolling volatility history and its stores
//! - [`tracker`] - IV/VIX rank and percentile over the rolling history
//! - [`engine`] - Metrics facade that runs a full analysis pass
//! - [`strategy`] - Strategy templates parameterised by the metrics
//!
//! # Key Invariants
//!
//! - Missing inputs never raise: every derived value is `Option` and
//!   absence propagates, it is never replaced by zero
//! - The history store is mutated exactly once per analysis pass
//! - History series never exceed the configured window (default 180)

pub mod atm;
pub mod chain;
pub mod engine;
pub mod error;
pub mod greeks;
pub mod history;
pub mod strategy;
pub mod tracker;
pub mod types;

pub use atm::{compute_atm_metrics, AtmMetrics};
pub use chain::{parse_chain, ChainAggregate, OptionChainSnapshot};
pub use engine::{MetricsEngine, MetricsResult};
pub use error::AnalyticsError;
pub use history::{HistoryStore, InMemoryHistoryStore, JsonFileHistoryStore, VolatilityHistory};
pub use strategy::{build_strategies, StrategyTemplate};
pub use tracker::{RankResult, RegimeRanks, VolatilityTracker};
pub use types::{ExpectedMove, Greeks, OptionType, PricingParams};

pub type Result<T> = std::result::Result<T, AnalyticsError>;
