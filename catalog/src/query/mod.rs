// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query building blocks shared by the storage backends
//!
//! Embedded backends evaluate these in process; the document-store backend
//! translates them into server-side filters and aggregation pipelines.

pub mod aggregate;
pub mod filter;

pub use aggregate::{
    average_rating, rate_products, CategoryPriceAccumulator, EmptyReviewPolicy,
    DEFAULT_RATING_THRESHOLD,
};
pub use filter::{ProductFilter, DISCOUNT_CATEGORY, DISCOUNT_PRICE_CEILING};
