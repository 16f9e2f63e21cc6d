//! Error type for the persistence layer.
//!
//! Only genuine storage faults cross the store boundary as errors.
//! Not-found lookups and malformed persisted records are modeled as
//! return values instead (see [`crate::store`] and
//! [`crate::medicine_item::parse_medicine_items_json`]).

use thiserror::Error;

/// Boxed cause of a storage fault, kept as the error source so callers
/// can walk the chain with [`std::error::Error::source`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A fault from the underlying durable medium or from serializing the
/// collection, wrapping the original cause.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Opening the durable medium failed.
    #[error("failed to open medicine storage: {source}")]
    Open {
        #[source]
        source: BoxedCause,
    },

    /// A read from the durable medium failed.
    #[error("failed to read medicine storage: {source}")]
    Read {
        #[source]
        source: BoxedCause,
    },

    /// A write to the durable medium failed.
    #[error("failed to write medicine storage: {source}")]
    Write {
        #[source]
        source: BoxedCause,
    },

    /// The in-memory collection could not be serialized back to JSON text.
    #[error("failed to serialize medicine items: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn open(cause: impl Into<BoxedCause>) -> Self {
        StorageError::Open {
            source: cause.into(),
        }
    }

    pub fn read(cause: impl Into<BoxedCause>) -> Self {
        StorageError::Read {
            source: cause.into(),
        }
    }

    pub fn write(cause: impl Into<BoxedCause>) -> Self {
        StorageError::Write {
            source: cause.into(),
        }
    }
}
