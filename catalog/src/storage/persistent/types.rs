// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver types and error handling
//!
//! This module defines the types, enums, and error handling used throughout
//! the storage driver system.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Storage backend configuration
///
/// Specifies which underlying storage technology holds the collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Sled - Pure Rust embedded database
    /// Best for: local catalogs, development
    #[default]
    Sled,

    /// Redb - Pure Rust ACID-compliant embedded database
    /// Best for: single-file catalogs, crash-safety
    Redb,

    /// Memory - In-memory storage for testing
    /// Best for: Unit testing, scratch sessions
    Memory,

    /// MongoDB - external document store reached over its wire protocol
    /// Best for: the shared production catalog
    Mongo,
}

impl StorageType {
    /// Whether this backend is a key/value tree evaluated in process
    pub fn is_embedded(self) -> bool {
        !matches!(self, StorageType::Mongo)
    }
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageType::Sled),
            "redb" => Ok(StorageType::Redb),
            "memory" => Ok(StorageType::Memory),
            "mongo" | "mongodb" => Ok(StorageType::Mongo),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: sled, redb, memory, mongo",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Sled => "sled",
            StorageType::Redb => "redb",
            StorageType::Memory => "memory",
            StorageType::Mongo => "mongo",
        };
        write!(f, "{}", name)
    }
}

/// Error type for storage driver operations
#[derive(Debug)]
pub enum StorageDriverError {
    /// I/O related errors (file system, network, etc.)
    IoError(std::io::Error),

    /// Data serialization or deserialization failed
    SerializationError(String),

    /// An insert-only write hit a key that is already stored
    KeyExists(String),

    /// The store could not be opened or reached
    Unavailable(String),

    /// The requested backend is not compiled into this build
    Unsupported(String),

    /// Driver-specific error (Sled, Redb, MongoDB, ...)
    BackendSpecific(String),
}

impl std::fmt::Display for StorageDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageDriverError::IoError(e) => write!(f, "I/O error: {}", e),
            StorageDriverError::SerializationError(e) => write!(f, "Serialization error: {}", e),
            StorageDriverError::KeyExists(key) => write!(f, "Key already exists: {}", key),
            StorageDriverError::Unavailable(e) => write!(f, "Store unavailable: {}", e),
            StorageDriverError::Unsupported(e) => write!(f, "Unsupported backend: {}", e),
            StorageDriverError::BackendSpecific(e) => write!(f, "Storage driver error: {}", e),
        }
    }
}

impl std::error::Error for StorageDriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageDriverError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for StorageDriverError {
    fn from(e: std::io::Error) -> Self {
        StorageDriverError::IoError(e)
    }
}

impl From<serde_json::Error> for StorageDriverError {
    fn from(e: serde_json::Error) -> Self {
        StorageDriverError::SerializationError(e.to_string())
    }
}

/// Wrap any backend error as a driver-specific failure
pub(crate) fn backend<E: std::fmt::Display>(e: E) -> StorageDriverError {
    StorageDriverError::BackendSpecific(e.to_string())
}

/// Printable form of a key for error messages
pub(crate) fn key_label(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// Result type for storage driver operations
pub type StorageResult<T> = Result<T, StorageDriverError>;
