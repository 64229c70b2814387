use crate::error::StoreError;
use crate::state::LedgerState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use surety_types::NotificationRecord;
use tracing::debug;

/// Everything needed to resume a ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub height: u64,
    pub state: LedgerState,
    pub notifications: Vec<NotificationRecord>,
    /// Genesis seed; reopening without an explicit index source reseeds from it.
    #[serde(default)]
    pub entropy_seed: u64,
    pub saved_at: DateTime<Utc>,
}

/// Persistence backend. The ledger saves after every committed transaction.
pub trait StateStore: Send + fmt::Debug {
    fn load(&self) -> Result<Option<LedgerSnapshot>, StoreError>;
    fn save(&mut self, snapshot: &LedgerSnapshot) -> Result<(), StoreError>;
}

/// Keeps the latest snapshot in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    latest: Option<LedgerSnapshot>,
    saves: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&LedgerSnapshot> {
        self.latest.as_ref()
    }

    pub fn saves(&self) -> u64 {
        self.saves
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerSnapshot>, StoreError> {
        Ok(self.latest.clone())
    }

    fn save(&mut self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        self.latest = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}

/// JSON file store.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
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
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<LedgerSnapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&mut self, snapshot: &LedgerSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, bytes)?;
        fs::rename(tmp_path, &self.path)?;
        debug!(path = %self.path.display(), height = snapshot.height, "Snapshot saved");
        Ok(())
    }
}
