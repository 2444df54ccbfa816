//! Analytics error types

use thiserror::Error;

use crate::history::StoreError;

/// Errors that can occur outside the metric computation itself
///
/// Metric computation never fails; these cover decoding inputs and
/// direct access to the history store and rejected pricing parameters.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Option chain document could not be decoded at all
    #[error("Invalid option chain: {0}")]
    InvalidChain(String),

    /// History store error
    #[error("History store error: {0}")]
    Store(#[from] StoreError),

    /// Pricing parameters outside their valid domain
    #[error("Invalid pricing parameters: {0}")]
    InvalidParams(String),
}
