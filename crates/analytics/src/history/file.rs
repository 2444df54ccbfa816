//! JSON file store for the volatility history
//!
//! The whole record is rewritten on every save. Writes go to a sibling
//! temporary file which is then renamed over the target, so a reader never
//! observes a half-written document.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::traits::{HistoryStore, StoreError, StoreResult};
use super::VolatilityHistory;

pub struct JsonFileHistoryStore {
    path: PathBuf,
}

impl JsonFileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "iv_history.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn load(&self) -> StoreResult<VolatilityHistory> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let history: VolatilityHistory = serde_json::from_str(&content)?;
        debug!(
            path = %self.path.display(),
            vix = history.vix.len(),
            atm_iv = history.atm_iv.len(),
            "Loaded volatility history"
        );
        Ok(history)
    }

    async fn save(&self, history: &VolatilityHistory) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec(history)?;
        let temp = self.temp_path();
        fs::write(&temp, body).await?;
        fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), "Saved volatility history");
        Ok(())
    }
}
