// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Product filters

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Product;

/// Category targeted by the discounted electronics lookup
pub const DISCOUNT_CATEGORY: &str = "Electronics";
/// Exclusive price ceiling of the discounted electronics lookup, in stored units
pub const DISCOUNT_PRICE_CEILING: f64 = 50000.0;

/// Conjunction of optional predicates over a product document
///
/// An empty filter matches every product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Exact, case-sensitive category match
    pub category: Option<String>,
    /// Strict upper bound on price
    pub price_below: Option<f64>,
}

impl ProductFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn price_below(mut self, ceiling: f64) -> Self {
        self.price_below = Some(ceiling);
        self
    }

    /// `category == "Electronics" AND price < 50000`
    pub fn discounted_electronics() -> Self {
        Self::new()
            .category(DISCOUNT_CATEGORY)
            .price_below(DISCOUNT_PRICE_CEILING)
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.price_below.is_none()
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(ceiling) = self.price_below {
            if product.price >= ceiling {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses = Vec::new();
        if let Some(category) = &self.category {
            clauses.push(format!("category = '{}'", category));
        }
        if let Some(ceiling) = self.price_below {
            clauses.push(format!("price < {}", ceiling));
        }
        if clauses.is_empty() {
            write!(f, "<all products>")
        } else {
            write!(f, "{}", clauses.join(" AND "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discounted_electronics_requires_both_predicates() {
        let filter = ProductFilter::discounted_electronics();

        assert!(filter.matches(&Product::new("E1", "Earbuds", "Electronics", 2999.0, 10)));
        assert!(!filter.matches(&Product::new("E2", "Laptop", "Electronics", 89999.0, 3)));
        assert!(!filter.matches(&Product::new("B1", "Novel", "Books", 299.0, 8)));
    }

    #[test]
    fn price_ceiling_is_exclusive() {
        let filter = ProductFilter::discounted_electronics();
        assert!(!filter.matches(&Product::new("E3", "Tablet", "Electronics", 50000.0, 1)));
        assert!(filter.matches(&Product::new("E4", "Tablet", "Electronics", 49999.99, 1)));
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let filter = ProductFilter::new().category("Electronics");
        assert!(!filter.matches(&Product::new("E5", "Mouse", "electronics", 500.0, 1)));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ProductFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&Product::new("X", "x", "Anything", 1e9, 0)));
        assert_eq!(filter.to_string(), "<all products>");
    }

    #[test]
    fn display_lists_clauses() {
        assert_eq!(
            ProductFilter::discounted_electronics().to_string(),
            "category = 'Electronics' AND price < 50000"
        );
    }
}
