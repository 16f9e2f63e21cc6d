//! # Medicine Cabinet Core
//!
//! Local-first persistence and status classification for a personal
//! medicine cabinet app. The whole collection of records lives as one
//! JSON array under a single durable key; this crate owns validated
//! CRUD over that collection and the time-derived urgency
//! classification the UI renders as status dots.
//!
//! ## Features
//!
//! - **Injectable storage port**: the store is built over a
//!   [`StorageBackend`] trait; ship [`RedbBackend`] in the app, inject
//!   [`MemoryBackend`] in tests.
//! - **Defensive ingestion**: persisted JSON is never trusted. Corrupt
//!   collection text degrades to an empty collection and malformed
//!   records are dropped (and counted), never raised as errors.
//! - **Collision-safe ids**: generated ids combine a millisecond
//!   timestamp with a random suffix, and the store rewrites any id that
//!   would collide before persisting.
//! - **One error type**: only [`StorageError`] crosses the store
//!   boundary; not-found is a value, not an exception.
//!
//! ## Quick Start
//!
//! ```no_run
//! use medicine_cabinet_core::{MedicineItemInput, MedicineStore, RedbBackend};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), medicine_cabinet_core::StorageError> {
//! let store = MedicineStore::new(RedbBackend::open("cabinet.redb")?);
//!
//! let item = store
//!     .create(MedicineItemInput {
//!         name: "Aspirin".to_string(),
//!         dosage: Some("100 mg".to_string()),
//!         expiry_date: Some("2027-03-01".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! println!("stored {} as {}", item.name, item.id);
//! # Ok(())
//! # }
//! ```
//!
//! Classification is a pure function the UI calls on every render:
//!
//! ```
//! use medicine_cabinet_core::{classify_now, MedicineStatus};
//!
//! assert_eq!(classify_now(true, Some("2020-01-01")), MedicineStatus::Scheduled);
//! assert_eq!(classify_now(false, None), MedicineStatus::None);
//! ```

pub mod error;
pub mod medicine_item;
pub mod status;
pub mod storage;
pub mod store;

pub use error::StorageError;
pub use medicine_item::{
    create_medicine_item, is_valid_medicine_item, parse_medicine_items_json, update_medicine_item,
    MedicineItem, MedicineItemInput, MedicineItemPatch,
};
pub use status::{classify, classify_now, MedicineStatus};
pub use storage::{MemoryBackend, RedbBackend, StorageBackend};
pub use store::{MedicineStore, MEDICINE_STORAGE_KEY};
