// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog data model
//!
//! This module provides:
//! - `Product` and its embedded `Review` documents
//! - Boundary validation for documents entering the catalog
//! - Result views returned by catalog operations

pub mod product;
pub mod views;

pub use product::{parse_products, parse_review_date, Product, Review};
pub use views::{CategoryPriceSummary, ProductSummary, RatedProduct};
