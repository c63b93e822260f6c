// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for catalog operations

use thiserror::Error;

use crate::storage::StorageDriverError;

/// Result type alias for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Main error type for catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No product carries the requested `product_id`
    #[error("Product not found: {0}")]
    NotFound(String),

    /// A `product_id` collides with the batch itself or with stored data
    #[error("Duplicate product_id '{product_id}' ({committed} documents committed before failure)")]
    DuplicateKey { product_id: String, committed: usize },

    /// The store could not be reached or opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Malformed input document or review
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other failure reported by a storage backend
    #[error("Storage error: {0}")]
    Storage(StorageDriverError),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or unsupported configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageDriverError> for CatalogError {
    fn from(err: StorageDriverError) -> Self {
        match err {
            StorageDriverError::KeyExists(product_id) => CatalogError::DuplicateKey {
                product_id,
                committed: 0,
            },
            StorageDriverError::Unavailable(msg) => CatalogError::Connection(msg),
            StorageDriverError::Unsupported(msg) => CatalogError::Config(msg),
            other => CatalogError::Storage(other),
        }
    }
}

impl CatalogError {
    /// Whether this error means the caller asked for something that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_exists_becomes_duplicate_key_with_nothing_committed() {
        let err: CatalogError = StorageDriverError::KeyExists("ELEC001".to_string()).into();
        match err {
            CatalogError::DuplicateKey {
                product_id,
                committed,
            } => {
                assert_eq!(product_id, "ELEC001");
                assert_eq!(committed, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unavailable_store_becomes_connection_error() {
        let err: CatalogError = StorageDriverError::Unavailable("locked".to_string()).into();
        assert!(matches!(err, CatalogError::Connection(_)));
        assert!(err.to_string().contains("locked"));
    }
}
