//! Persistence of the ledger state

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::CoreResult;
use crate::state::LedgerState;

/// Where ledger state lives between runs
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read the saved state; `None` when nothing has been saved yet
    async fn load(&self) -> CoreResult<Option<LedgerState>>;

    /// Replace the saved state
    async fn save(&self, state: &LedgerState) -> CoreResult<()>;

    /// Human-readable location, for logs and the settings page
    fn describe(&self) -> String;
}

/// One JSON document on disk, replaced atomically on every save
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LedgerStore for JsonFileStore {
    async fn load(&self) -> CoreResult<Option<LedgerState>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let state: LedgerState = serde_json::from_str(&content)?;
                log::debug!(
                    "Loaded {} transactions, {} fixed expenses, {} closings from {}",
                    state.transactions.len(),
                    state.fixed_expenses.len(),
                    state.history.len(),
                    self.path.display()
                );
                Ok(Some(state))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, state: &LedgerState) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.sibling(".tmp");
        tokio::fs::write(&tmp, &json).await?;

        // Keep the previous version next to the file
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            tokio::fs::copy(&self.path, self.sibling(".bak")).await?;
        }

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Option<LedgerState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LedgerState) -> Self {
        Self {
            saved: Mutex::new(Some(state)),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load(&self) -> CoreResult<Option<LedgerState>> {
        Ok(self.saved.lock().await.clone())
    }

    async fn save(&self, state: &LedgerState) -> CoreResult<()> {
        *self.saved.lock().await = Some(state.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
