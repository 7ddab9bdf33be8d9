//! MongoDB backend of the event store.

/// Connection settings.
pub mod config;
mod connection;
mod error;
mod models;
/// The store itself.
pub mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoEventStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::CorruptDocument {
                collection,
                id,
                reason,
            } => StorageError::Corrupt {
                collection,
                id,
                reason,
            },
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
