//! Custom error types for the common library
//!
//! This module defines the storage error type shared by every collection
//! backend and by the database helpers.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Error type for collection storage and database operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred while establishing a database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[from] SqlxError),

    /// Error occurred while reading or writing a collection file
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document does not have the shape its backend requires
    #[error("Invalid document in collection {collection}: {reason}")]
    InvalidDocument { collection: String, reason: String },

    /// A collection name that cannot be stored safely
    #[error("Invalid collection name: {0}")]
    InvalidName(String),

    /// Configuration error
    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
