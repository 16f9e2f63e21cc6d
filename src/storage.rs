//! Durable storage boundary: an asynchronous key → text port, plus the
//! two shipped adapters.
//!
//! The store is constructed with its backend rather than reaching into
//! process-wide state, so tests can inject doubles and the app can swap
//! the medium without touching CRUD logic.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use log::info;
use redb::{Database, TableDefinition, TableError};
use tokio::sync::RwLock;

use crate::error::StorageError;

const CABINET_TABLE: TableDefinition<&str, &str> = TableDefinition::new("cabinet");

/// Generic asynchronous key → UTF-8 text store.
///
/// Faults must come back as [`StorageError`] wrapping the medium's
/// native error; a missing key is `Ok(None)`, not a fault.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Production backend over an embedded [redb](https://docs.rs/redb)
/// database file. One table, key → JSON text, each `set` its own
/// committed write transaction, which gives the single-key atomicity
/// the store relies on.
pub struct RedbBackend {
    db: Database,
}

impl RedbBackend {
    /// Opens the database file at `path`, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(StorageError::open)?;
        info!("Opened cabinet database at {}", path.as_ref().display());
        Ok(Self { db })
    }
}

#[async_trait]
impl StorageBackend for RedbBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let txn = self.db.begin_read().map_err(StorageError::read)?;
        let table = match txn.open_table(CABINET_TABLE) {
            Ok(table) => table,
            // No write has happened yet, so the table does not exist.
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(error) => return Err(StorageError::read(error)),
        };
        let value = table.get(key).map_err(StorageError::read)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(StorageError::write)?;
        {
            let mut table = txn.open_table(CABINET_TABLE).map_err(StorageError::write)?;
            table.insert(key, value).map_err(StorageError::write)?;
        }
        txn.commit().map_err(StorageError::write)?;
        Ok(())
    }
}

/// Ephemeral in-process backend. The test double, also handy for
/// previews where nothing should touch disk.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
