//! Error types for the MongoDB-backed entity store.

use thiserror::Error;

/// Errors that can occur during `MongoStore` operations.
#[derive(Error, Debug)]
pub enum MongoStoreError {
    /// The MongoDB driver reported a failure.
    #[error("MongoDB driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// A stored document carries an id that is not a valid UUID.
    #[error("invalid document id: {0}")]
    InvalidId(String),
}
