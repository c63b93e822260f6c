// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog query service
//!
//! The public facade over a `ProductStore`. It validates input before it
//! reaches the store, logs each operation, and otherwise passes results and
//! errors through unchanged. No caching and no retries.

use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{parse_products, CategoryPriceSummary, Product, RatedProduct, Review};
use crate::query::{EmptyReviewPolicy, ProductFilter};
use crate::storage::{open_store, ProductCursor, ProductStore};

/// The five catalog operations plus a few read helpers
///
/// Cheap to clone; clones share the same store handle.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    empty_reviews: EmptyReviewPolicy,
}

impl CatalogService {
    /// Open the store named by `config`
    pub fn open(config: &CatalogConfig) -> CatalogResult<Self> {
        config.validate()?;
        let store = open_store(config)?;
        Ok(Self::with_store(store).with_empty_review_policy(config.empty_reviews))
    }

    /// Wrap an already opened store
    pub fn with_store(store: Arc<dyn ProductStore>) -> Self {
        Self {
            store,
            empty_reviews: EmptyReviewPolicy::default(),
        }
    }

    pub fn with_empty_review_policy(mut self, policy: EmptyReviewPolicy) -> Self {
        self.empty_reviews = policy;
        self
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    pub fn empty_review_policy(&self) -> EmptyReviewPolicy {
        self.empty_reviews
    }

    /// Insert a batch of new products, returning how many were loaded
    ///
    /// Every document is validated before anything is written. A repeated or
    /// already stored `product_id` fails with [`CatalogError::DuplicateKey`].
    pub fn bulk_load(&self, products: &[Product]) -> CatalogResult<usize> {
        if products.is_empty() {
            info!("Bulk load of an empty batch into {}", self.store.describe());
            return Ok(0);
        }

        for (index, product) in products.iter().enumerate() {
            product.validate().map_err(|e| match e {
                CatalogError::Validation(msg) => {
                    CatalogError::Validation(format!("document {}: {}", index, msg))
                }
                other => other,
            })?;
        }

        match self.store.insert_many(products) {
            Ok(loaded) => {
                info!("Loaded {} products into {}", loaded, self.store.describe());
                Ok(loaded)
            }
            Err(e) => {
                warn!("Bulk load into {} rejected: {}", self.store.describe(), e);
                Err(e)
            }
        }
    }

    /// Parse a JSON array of product documents and load it
    pub fn load_json(&self, text: &str) -> CatalogResult<usize> {
        let products = parse_products(text)?;
        self.bulk_load(&products)
    }

    /// Read a catalog import file and load it
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> CatalogResult<usize> {
        let path = path.as_ref();
        info!("Loading catalog file {}", path.display());
        let text = fs::read_to_string(path)?;
        self.load_json(&text)
    }

    /// Electronics priced strictly below 50000, projected to `{name, price, stock}`
    ///
    /// Each call runs the query again; the returned cursor is lazy.
    pub fn find_discounted_electronics(&self) -> CatalogResult<ProductCursor<'_>> {
        self.find(&ProductFilter::discounted_electronics())
    }

    pub fn find(&self, filter: &ProductFilter) -> CatalogResult<ProductCursor<'_>> {
        if let Some(ceiling) = filter.price_below {
            if !ceiling.is_finite() {
                return Err(CatalogError::Validation(format!(
                    "price ceiling must be a finite number, got {}",
                    ceiling
                )));
            }
        }
        info!("Finding products where {}", filter);
        self.store.find(filter)
    }

    /// Products whose average rating is at least `threshold`
    ///
    /// Unreviewed products are handled by the service's
    /// [`EmptyReviewPolicy`].
    pub fn find_highly_rated(&self, threshold: f64) -> CatalogResult<Vec<RatedProduct>> {
        if !threshold.is_finite() {
            return Err(CatalogError::Validation(format!(
                "rating threshold must be a finite number, got {}",
                threshold
            )));
        }

        let rated = self.store.find_rated(threshold, self.empty_reviews)?;
        info!(
            "{} products rated >= {} (empty reviews: {})",
            rated.len(),
            threshold,
            self.empty_reviews
        );
        Ok(rated)
    }

    /// Append one review to a product's reviews
    ///
    /// Not idempotent: calling twice appends the review twice.
    pub fn append_review(&self, product_id: &str, review: &Review) -> CatalogResult<()> {
        review.validate()?;
        self.store.push_review(product_id, review)?;
        info!(
            "Appended review by {} to product {}",
            review.user_id, product_id
        );
        Ok(())
    }

    /// Average price and product count per category, highest average first
    pub fn average_price_by_category(&self) -> CatalogResult<Vec<CategoryPriceSummary>> {
        let rows = self.store.category_price_summary()?;
        info!("Computed price summary for {} categories", rows.len());
        Ok(rows)
    }

    pub fn get_product(&self, product_id: &str) -> CatalogResult<Product> {
        self.store
            .get(product_id)?
            .ok_or_else(|| CatalogError::NotFound(product_id.to_string()))
    }

    pub fn count(&self) -> CatalogResult<u64> {
        self.store.count()
    }
}
