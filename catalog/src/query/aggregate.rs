// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-process aggregations: review analysis and per-category pricing

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{CategoryPriceSummary, Product, RatedProduct, Review};

/// Default minimum average rating for the review analysis
pub const DEFAULT_RATING_THRESHOLD: f64 = 4.0;

/// How the review analysis treats products that have no reviews
///
/// The mean of an empty rating list is undefined, so one of these must be
/// chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyReviewPolicy {
    /// Unreviewed products never pass the threshold
    #[default]
    Exclude,
    /// Unreviewed products are always returned, with a null average
    IncludeUnrated,
    /// Unreviewed products average 0.0 and are compared like any other
    Zero,
}

impl std::str::FromStr for EmptyReviewPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclude" => Ok(EmptyReviewPolicy::Exclude),
            "include" | "include-unrated" | "null" => Ok(EmptyReviewPolicy::IncludeUnrated),
            "zero" => Ok(EmptyReviewPolicy::Zero),
            _ => Err(format!(
                "Unknown empty review policy: {}. Valid options: exclude, include-unrated, zero",
                s
            )),
        }
    }
}

impl fmt::Display for EmptyReviewPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EmptyReviewPolicy::Exclude => "exclude",
            EmptyReviewPolicy::IncludeUnrated => "include-unrated",
            EmptyReviewPolicy::Zero => "zero",
        };
        write!(f, "{}", name)
    }
}

/// Arithmetic mean of the review ratings, `None` when there are no reviews
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: f64 = reviews.iter().map(|review| review.rating).sum();
    Some(total / reviews.len() as f64)
}

/// Review analysis pipeline
///
/// Stage one derives `avg_rating` for every product, stage two keeps the
/// products whose derived average reaches `threshold`. The filter reads the
/// derived field, so the stages cannot be swapped.
pub fn rate_products<I>(products: I, threshold: f64, policy: EmptyReviewPolicy) -> Vec<RatedProduct>
where
    I: IntoIterator<Item = Product>,
{
    products
        .into_iter()
        .map(|product| derive_rating(product, policy))
        .filter(|rated| passes_threshold(rated, threshold, policy))
        .collect()
}

fn derive_rating(product: Product, policy: EmptyReviewPolicy) -> RatedProduct {
    let avg_rating = match average_rating(&product.reviews) {
        Some(avg) => Some(avg),
        None if policy == EmptyReviewPolicy::Zero => Some(0.0),
        None => None,
    };
    RatedProduct {
        product,
        avg_rating,
    }
}

fn passes_threshold(rated: &RatedProduct, threshold: f64, policy: EmptyReviewPolicy) -> bool {
    match rated.avg_rating {
        Some(avg) => avg >= threshold,
        None => policy == EmptyReviewPolicy::IncludeUnrated,
    }
}

/// Running group-by over `category` accumulating price sum and count
#[derive(Debug, Default)]
pub struct CategoryPriceAccumulator {
    groups: BTreeMap<String, (f64, u64)>,
}

impl CategoryPriceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, product: &Product) {
        let entry = self
            .groups
            .entry(product.category.clone())
            .or_insert((0.0, 0));
        entry.0 += product.price;
        entry.1 += 1;
    }

    /// One row per category seen, sorted by average price descending
    ///
    /// Rows with equal averages come out in no guaranteed order.
    pub fn finish(self) -> Vec<CategoryPriceSummary> {
        let mut rows: Vec<CategoryPriceSummary> = self
            .groups
            .into_iter()
            .map(|(category, (total, count))| CategoryPriceSummary {
                category,
                avg_price: total / count as f64,
                product_count: count,
            })
            .collect();
        sort_by_avg_price_desc(&mut rows);
        rows
    }
}

impl<'a> Extend<&'a Product> for CategoryPriceAccumulator {
    fn extend<T: IntoIterator<Item = &'a Product>>(&mut self, iter: T) {
        for product in iter {
            self.add(product);
        }
    }
}

pub fn sort_by_avg_price_desc(rows: &mut [CategoryPriceSummary]) {
    rows.sort_by(|a, b| b.avg_price.total_cmp(&a.avg_price));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(id: &str, ratings: &[f64]) -> Product {
        let reviews = ratings
            .iter()
            .enumerate()
            .map(|(i, rating)| Review::new(format!("U{}", i), *rating, None))
            .collect();
        Product::new(id, id, "Electronics", 100.0, 1).with_reviews(reviews)
    }

    fn ids(rated: &[RatedProduct]) -> Vec<&str> {
        rated.iter().map(|r| r.product.product_id.as_str()).collect()
    }

    #[test]
    fn average_of_no_reviews_is_undefined() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&rated("A", &[4.0, 5.0]).reviews), Some(4.5));
    }

    #[test]
    fn threshold_is_inclusive() {
        let products = vec![rated("EXACT", &[4.0, 4.0]), rated("BELOW", &[4.0, 3.0])];
        let result = rate_products(products, DEFAULT_RATING_THRESHOLD, EmptyReviewPolicy::Exclude);
        assert_eq!(ids(&result), vec!["EXACT"]);
        assert_eq!(result[0].avg_rating, Some(4.0));
    }

    #[test]
    fn unreviewed_products_are_excluded_by_default() {
        let products = vec![rated("GOOD", &[5.0]), rated("NONE", &[])];
        let result = rate_products(products, 4.0, EmptyReviewPolicy::default());
        assert_eq!(ids(&result), vec!["GOOD"]);
    }

    #[test]
    fn include_unrated_keeps_unreviewed_products_with_null_average() {
        let products = vec![rated("GOOD", &[5.0]), rated("NONE", &[]), rated("BAD", &[1.0])];
        let result = rate_products(products, 4.0, EmptyReviewPolicy::IncludeUnrated);
        assert_eq!(ids(&result), vec!["GOOD", "NONE"]);
        assert_eq!(result[1].avg_rating, None);
    }

    #[test]
    fn zero_policy_compares_unreviewed_products_as_zero() {
        let products = vec![rated("NONE", &[])];
        assert!(rate_products(products.clone(), 4.0, EmptyReviewPolicy::Zero).is_empty());

        let result = rate_products(products, 0.0, EmptyReviewPolicy::Zero);
        assert_eq!(result[0].avg_rating, Some(0.0));
    }

    #[test]
    fn policy_parses_from_cli_spellings() {
        assert_eq!("exclude".parse::<EmptyReviewPolicy>(), Ok(EmptyReviewPolicy::Exclude));
        assert_eq!("NULL".parse::<EmptyReviewPolicy>(), Ok(EmptyReviewPolicy::IncludeUnrated));
        assert_eq!("zero".parse::<EmptyReviewPolicy>(), Ok(EmptyReviewPolicy::Zero));
        assert!("maybe".parse::<EmptyReviewPolicy>().is_err());
        assert_eq!(EmptyReviewPolicy::IncludeUnrated.to_string(), "include-unrated");
    }

    #[test]
    fn category_prices_match_reference_fixture() {
        let products = [
            Product::new("E1", "a", "Electronics", 100.0, 1),
            Product::new("E2", "b", "Electronics", 300.0, 1),
            Product::new("B1", "c", "Books", 50.0, 1),
        ];
        let mut acc = CategoryPriceAccumulator::new();
        acc.extend(products.iter());

        assert_eq!(
            acc.finish(),
            vec![
                CategoryPriceSummary {
                    category: "Electronics".to_string(),
                    avg_price: 200.0,
                    product_count: 2,
                },
                CategoryPriceSummary {
                    category: "Books".to_string(),
                    avg_price: 50.0,
                    product_count: 1,
                },
            ]
        );
    }

    #[test]
    fn no_products_means_no_categories() {
        assert!(CategoryPriceAccumulator::new().finish().is_empty());
    }
}
