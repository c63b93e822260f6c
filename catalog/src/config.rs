// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog configuration
//!
//! Addresses the product collection explicitly: backend, location, database
//! and collection name. Every field has a default, so a JSON config file only
//! needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, CatalogResult};
use crate::query::{EmptyReviewPolicy, DEFAULT_RATING_THRESHOLD};
use crate::storage::StorageType;

/// Default database name
pub const DEFAULT_DATABASE: &str = "FlexiMartDB";
/// Default collection name
pub const DEFAULT_COLLECTION: &str = "products";

/// Location of the product collection and defaults for the review analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Storage backend
    pub storage: StorageType,
    /// Root directory for embedded backends
    pub path: PathBuf,
    pub database: String,
    pub collection: String,
    /// Connection string, required by the mongo backend only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mongo_uri: Option<String>,
    /// Threshold used when a caller does not pass one
    pub rating_threshold: f64,
    pub empty_reviews: EmptyReviewPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            storage: StorageType::default(),
            path: PathBuf::from("./data"),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            mongo_uri: None,
            rating_threshold: DEFAULT_RATING_THRESHOLD,
            empty_reviews: EmptyReviewPolicy::default(),
        }
    }
}

impl CatalogConfig {
    /// In-memory configuration, mostly useful for tests
    pub fn memory() -> Self {
        Self {
            storage: StorageType::Memory,
            ..Self::default()
        }
    }

    /// Read a JSON config file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: CatalogConfig = serde_json::from_str(&text)
            .map_err(|e| CatalogError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.database.trim().is_empty() {
            return Err(CatalogError::Config(
                "database name must not be empty".to_string(),
            ));
        }
        if self.collection.trim().is_empty() {
            return Err(CatalogError::Config(
                "collection name must not be empty".to_string(),
            ));
        }
        if !self.rating_threshold.is_finite() {
            return Err(CatalogError::Config(format!(
                "rating_threshold must be a finite number, got {}",
                self.rating_threshold
            )));
        }
        if self.storage == StorageType::Mongo && self.mongo_uri.is_none() {
            return Err(CatalogError::Config(
                "the mongo backend requires `mongo_uri`".to_string(),
            ));
        }
        Ok(())
    }
}
