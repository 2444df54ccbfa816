//! Store traits for the volatility history
//!
//! This module defines the trait that all history store implementations
//! must satisfy.

use async_trait::async_trait;

use super::VolatilityHistory;

/// Errors that can occur in the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("History not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Other(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for volatility history storage
///
/// Implementations can be in-memory, file-backed or any other durable
/// key-value backend. `save` replaces the whole record.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the persisted history.
    ///
    /// Returns [`StoreError::NotFound`] when nothing has been saved yet.
    async fn load(&self) -> StoreResult<VolatilityHistory>;

    /// Replace the persisted history
    async fn save(&self, history: &VolatilityHistory) -> StoreResult<()>;
}
