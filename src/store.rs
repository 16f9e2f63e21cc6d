//! Persistence store: owns the single collection key and provides
//! validated CRUD with collision-safe id assignment.
//!
//! Every operation re-reads the full collection from the backend and
//! writes it back whole; nothing is cached between calls. Mutating
//! operations serialize their read-modify-write sequence behind an
//! in-process mutex so two concurrent writers on the same store cannot
//! silently lose an update. Cross-process writers are not coordinated.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use log::warn;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::medicine_item::{
    create_medicine_item, parse_medicine_items_counted, update_medicine_item, MedicineItem,
    MedicineItemInput, MedicineItemPatch,
};
use crate::storage::StorageBackend;

/// The one durable key this core uses.
pub const MEDICINE_STORAGE_KEY: &str = "mypharma/medicine_items";

/// CRUD store for the medicine collection, generic over its storage
/// backend.
///
/// Only [`StorageError`] ever crosses this boundary as an error.
/// Absent ids come back as `None`/`false`, and malformed persisted
/// records are dropped during reads (counted via
/// [`dropped_records`](MedicineStore::dropped_records)).
pub struct MedicineStore<B> {
    backend: B,
    write_lock: Mutex<()>,
    dropped: AtomicU64,
}

impl<B: StorageBackend> MedicineStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns the full validated collection, possibly empty. Corrupt
    /// storage degrades to an empty collection, never an error.
    pub async fn get_all(&self) -> Result<Vec<MedicineItem>, StorageError> {
        self.read_items().await
    }

    /// Looks up one record. Absence is a normal outcome.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<MedicineItem>, StorageError> {
        let items = self.read_items().await?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    /// Builds a record from `input`, guarantees its id is unique within
    /// the collection, appends it, and persists. Returns the stored
    /// record with its final id.
    pub async fn create(&self, input: MedicineItemInput) -> Result<MedicineItem, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;

        let mut item = create_medicine_item(input);
        item.id = resolve_id_collision(item.id, &items);

        items.push(item.clone());
        self.write_items(&items).await?;
        Ok(item)
    }

    /// Applies `patch` to the record with `id`, re-stamping
    /// `updated_at`. Returns `None` without writing when no record
    /// matches.
    pub async fn update(
        &self,
        id: &str,
        patch: MedicineItemPatch,
    ) -> Result<Option<MedicineItem>, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;

        let Some(position) = items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };
        let updated = update_medicine_item(&items[position], &patch);
        items[position] = updated.clone();

        self.write_items(&items).await?;
        Ok(Some(updated))
    }

    /// Removes the record with `id`. Returns `false` without writing
    /// when no record matches.
    pub async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.read_items().await?;

        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }

        self.write_items(&items).await?;
        Ok(true)
    }

    /// Running count of records silently dropped by validation during
    /// reads, so the fail-open recovery policy stays observable.
    pub fn dropped_records(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    async fn read_items(&self) -> Result<Vec<MedicineItem>, StorageError> {
        let raw = self
            .backend
            .get(MEDICINE_STORAGE_KEY)
            .await?
            // Missing key reads as the empty collection.
            .unwrap_or_else(|| "[]".to_string());

        let (items, dropped) = parse_medicine_items_counted(&raw);
        if dropped > 0 {
            self.dropped.fetch_add(dropped as u64, Ordering::Relaxed);
            warn!("Dropped {dropped} invalid medicine record(s) while reading storage");
        }
        Ok(items)
    }

    async fn write_items(&self, items: &[MedicineItem]) -> Result<(), StorageError> {
        let json = serde_json::to_string(items)?;
        self.backend.set(MEDICINE_STORAGE_KEY, &json).await
    }
}

/// Rewrites `candidate` until it collides with no existing id: first by
/// appending the current millisecond timestamp, then with an attempt
/// counter for the pathological same-millisecond case.
pub(crate) fn resolve_id_collision(candidate: String, items: &[MedicineItem]) -> String {
    let taken = |id: &str| items.iter().any(|item| item.id == id);
    if !taken(&candidate) {
        return candidate;
    }

    let millis = Utc::now().timestamp_millis();
    let mut id = format!("{candidate}-{millis}");
    let mut attempt = 2u32;
    while taken(&id) {
        id = format!("{candidate}-{millis}-{attempt}");
        attempt += 1;
    }
    warn!("Medicine id collision on '{candidate}', stored as '{id}'");
    id
}
