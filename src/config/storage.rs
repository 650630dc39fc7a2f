//! Storage backend configuration

use crate::storage::{InMemoryLedgerStorage, LedgerStorage, SqliteLedgerStorage};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Which `LedgerStorage` implementation to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// SQLite file, created if absent
    pub database_path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_path: PathBuf::from("rating_system.db"),
        }
    }
}

impl StorageSettings {
    pub fn open(&self) -> crate::error::Result<Arc<dyn LedgerStorage>> {
        match self.backend {
            StorageBackend::Sqlite => {
                info!("Using SQLite storage at {}", self.database_path.display());
                Ok(Arc::new(SqliteLedgerStorage::open(&self.database_path)?))
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; nothing will be persisted");
                Ok(Arc::new(InMemoryLedgerStorage::new()))
            }
        }
    }
}
