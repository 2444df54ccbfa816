//! Observability infrastructure for OptionLens
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Analysis counters and timings via the `metrics` facade
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("optlens", LogFormat::Pretty)?;
//! ```
//!
//! No metrics exporter is installed here. Without a recorder the
//! `metrics` macros are no-ops; a host process may install one.

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{AnalysisMetrics, AnalysisTimer};
