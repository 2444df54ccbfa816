use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::{HistoryStore, StoreError, StoreResult};
use super::VolatilityHistory;

/// In-memory history store
///
/// Data is lost on restart.
pub struct InMemoryHistoryStore {
    history: RwLock<Option<VolatilityHistory>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            history: RwLock::new(None),
        }
    }

    /// Create a store pre-seeded with `history`
    pub fn with_history(history: VolatilityHistory) -> Self {
        Self {
            history: RwLock::new(Some(history)),
        }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn load(&self) -> StoreResult<VolatilityHistory> {
        let history = self.history.read().await;
        history
            .clone()
            .ok_or_else(|| StoreError::NotFound("in-memory history is empty".to_string()))
    }

    async fn save(&self, history: &VolatilityHistory) -> StoreResult<()> {
        let mut slot = self.history.write().await;
        *slot = Some(history.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_load_before_save() {
        let store = InMemoryHistoryStore::new();
        assert_matches!(store.load().await, Err(StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = InMemoryHistoryStore::new();
        let history = VolatilityHistory {
            vix: vec![13.1, 13.4],
            atm_iv: vec![12.0],
        };

        store.save(&history).await.unwrap();
        assert_eq!(store.load().await.unwrap(), history);
    }
}
