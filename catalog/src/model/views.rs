// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result views returned by catalog operations

use serde::{Deserialize, Serialize};

use super::Product;

/// Projection of a product to `{name, price, stock}`; carries no identity field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub price: f64,
    pub stock: u32,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
        }
    }
}

/// A full product document with its derived average rating
///
/// `avg_rating` is `None` only for unreviewed products admitted by
/// [`EmptyReviewPolicy::IncludeUnrated`](crate::query::EmptyReviewPolicy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "avgRating")]
    pub avg_rating: Option<f64>,
}

/// One row of the per-category price aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPriceSummary {
    pub category: String,
    pub avg_price: f64,
    pub product_count: u64,
}
