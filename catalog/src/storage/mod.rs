// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage boundary for the product collection
//!
//! This module provides:
//! - The `ProductStore` trait every backend implements
//! - `KvProductStore`, shared by the embedded key/value drivers
//! - `MongoProductStore` for an external MongoDB deployment (feature `mongo`)
//! - `open_store`, which turns a `CatalogConfig` into an explicit store handle

pub mod kv_store;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod persistent;

use log::info;
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{CategoryPriceSummary, Product, ProductSummary, RatedProduct, Review};
use crate::query::{EmptyReviewPolicy, ProductFilter};

pub use kv_store::KvProductStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoProductStore;
pub use persistent::{StorageDriver, StorageDriverError, StorageResult, StorageTree, StorageType};

/// Lazy, finite result sequence of a filtered lookup
///
/// Dropping it releases the underlying cursor; running the lookup again
/// re-executes the query.
pub type ProductCursor<'a> = Box<dyn Iterator<Item = CatalogResult<ProductSummary>> + 'a>;

/// Collection-level operations a catalog backend must support
pub trait ProductStore: Send + Sync {
    /// Human-readable location of the collection, used in logs
    fn describe(&self) -> String;

    /// Insert new documents; returns how many were inserted
    ///
    /// Implementations fail with [`CatalogError::DuplicateKey`] when a
    /// `product_id` is repeated in the batch or already stored.
    fn insert_many(&self, products: &[Product]) -> CatalogResult<usize>;

    /// Products matching `filter`, projected to `{name, price, stock}`
    fn find(&self, filter: &ProductFilter) -> CatalogResult<ProductCursor<'_>>;

    /// Products whose average review rating is at least `threshold`
    fn find_rated(
        &self,
        threshold: f64,
        policy: EmptyReviewPolicy,
    ) -> CatalogResult<Vec<RatedProduct>>;

    /// Append `review` to one product's reviews
    ///
    /// Fails with [`CatalogError::NotFound`] and writes nothing when no
    /// product carries `product_id`.
    fn push_review(&self, product_id: &str, review: &Review) -> CatalogResult<()>;

    /// Average price and product count per category, highest average first
    fn category_price_summary(&self) -> CatalogResult<Vec<CategoryPriceSummary>>;

    fn get(&self, product_id: &str) -> CatalogResult<Option<Product>>;

    fn count(&self) -> CatalogResult<u64>;
}

/// Open the store described by `config`
pub fn open_store(config: &CatalogConfig) -> CatalogResult<Arc<dyn ProductStore>> {
    let store: Arc<dyn ProductStore> = if config.storage.is_embedded() {
        let tree = persistent::open_tree(
            config.storage,
            &config.path,
            &config.database,
            &config.collection,
        )?;
        Arc::new(KvProductStore::new(
            tree,
            config.storage,
            &config.database,
            &config.collection,
        ))
    } else {
        open_mongo(config)?
    };

    info!("Opened product collection {}", store.describe());
    Ok(store)
}

#[cfg(feature = "mongo")]
fn open_mongo(config: &CatalogConfig) -> CatalogResult<Arc<dyn ProductStore>> {
    let uri = config.mongo_uri.as_deref().ok_or_else(|| {
        CatalogError::Config("the mongo backend requires `mongo_uri`".to_string())
    })?;
    let store = MongoProductStore::connect(uri, &config.database, &config.collection)?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo"))]
fn open_mongo(_config: &CatalogConfig) -> CatalogResult<Arc<dyn ProductStore>> {
    Err(CatalogError::Config(
        "this build does not include the `mongo` feature".to_string(),
    ))
}
