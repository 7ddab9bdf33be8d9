//! Errors raised by the MongoDB backend before they become [`StorageError`](crate::dao::storage::StorageError).

use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failure of a MongoDB backend operation.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Rejected URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The driver rejected the client options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent before giving up.
        attempts: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A health check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Creating an index failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection involved.
        collection: &'static str,
        /// Indexed field.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A query failed.
    #[error("failed to read from collection `{collection}`")]
    Read {
        /// Collection involved.
        collection: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An insert, replace or delete failed.
    #[error("failed to write to collection `{collection}`")]
    Write {
        /// Collection involved.
        collection: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A stored document could not be mapped onto an entity.
    #[error("corrupt {collection} document `{id}`: {reason}")]
    CorruptDocument {
        /// Collection involved.
        collection: &'static str,
        /// Identifier of the document.
        id: String,
        /// Why the mapping failed.
        reason: String,
    },
}
