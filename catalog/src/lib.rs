// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! FlexiMart catalog - product catalog query service
//!
//! This crate wraps a single `products` document collection and exposes a
//! fixed set of catalog operations on top of it:
//!
//! - bulk loading validated product documents
//! - filtered lookups (discounted electronics, ad-hoc filters)
//! - review analysis (average rating per product, threshold filter)
//! - appending a review to one product
//! - average price per category, sorted descending
//!
//! # Quick Start
//!
//! ```no_run
//! use fleximart_catalog::{CatalogConfig, CatalogService, StorageType};
//!
//! # fn main() -> Result<(), fleximart_catalog::CatalogError> {
//! let config = CatalogConfig {
//!     storage: StorageType::Memory,
//!     ..CatalogConfig::default()
//! };
//! let service = CatalogService::open(&config)?;
//! service.load_file("products_catalog.json")?;
//!
//! for summary in service.find_discounted_electronics()? {
//!     let summary = summary?;
//!     println!("{} {} {}", summary.name, summary.price, summary.stock);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  CatalogService (service)               │
//! └─────────────────────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  ProductStore (storage boundary)        │
//! │  - KvProductStore over StorageTree      │
//! │    (memory, sled, redb)                 │
//! │  - MongoProductStore (feature "mongo")  │
//! └─────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod service;
pub mod storage;

pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use model::{CategoryPriceSummary, Product, ProductSummary, RatedProduct, Review};
pub use query::{EmptyReviewPolicy, ProductFilter};
pub use service::CatalogService;
pub use storage::{open_store, ProductCursor, ProductStore, StorageType};
