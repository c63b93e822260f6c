// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Product and review documents
//!
//! Documents arrive as loosely structured JSON. They are deserialized into
//! typed records and validated before they reach a store, so every backend
//! only ever holds well-formed products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{CatalogError, CatalogResult};

/// Lowest accepted review rating
pub const MIN_RATING: f64 = 1.0;
/// Highest accepted review rating
pub const MAX_RATING: f64 = 5.0;

/// A product document in the catalog collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique business key
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: u32,
    /// Append-only in practice; may be empty
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Remaining top-level fields of the source document, kept verbatim
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
}

/// A review embedded in a product document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: String,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(with = "review_date")]
    pub date: DateTime<Utc>,
}

impl Product {
    /// Create a product with no reviews and no extra attributes
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        stock: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            category: category.into(),
            price,
            stock,
            reviews: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// Builder-style helper for attaching reviews
    pub fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
        self.reviews = reviews;
        self
    }

    /// Check the document against the catalog's field constraints
    pub fn validate(&self) -> CatalogResult<()> {
        if self.product_id.trim().is_empty() {
            return Err(CatalogError::Validation(
                "product_id must not be empty".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "product '{}': name must not be empty",
                self.product_id
            )));
        }
        if self.category.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "product '{}': category must not be empty",
                self.product_id
            )));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CatalogError::Validation(format!(
                "product '{}': price must be a non-negative number, got {}",
                self.product_id, self.price
            )));
        }
        for (index, review) in self.reviews.iter().enumerate() {
            review.validate().map_err(|e| match e {
                CatalogError::Validation(msg) => CatalogError::Validation(format!(
                    "product '{}', review {}: {}",
                    self.product_id, index, msg
                )),
                other => other,
            })?;
        }
        Ok(())
    }
}

impl Review {
    /// Create a review dated now
    pub fn new(user_id: impl Into<String>, rating: f64, comment: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            rating,
            comment,
            date: Utc::now(),
        }
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(CatalogError::Validation(
                "user_id must not be empty".to_string(),
            ));
        }
        if !self.rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::Validation(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, self.rating
            )));
        }
        Ok(())
    }
}

/// Parse a JSON array of product documents and validate each one
///
/// This is the catalog import format: the same array an external import
/// tool would feed into the collection.
pub fn parse_products(text: &str) -> CatalogResult<Vec<Product>> {
    let products: Vec<Product> = serde_json::from_str(text).map_err(|e| {
        CatalogError::Validation(format!(
            "malformed product document at line {}, column {}: {}",
            e.line(),
            e.column(),
            e
        ))
    })?;

    for (index, product) in products.iter().enumerate() {
        product.validate().map_err(|e| match e {
            CatalogError::Validation(msg) => {
                CatalogError::Validation(format!("document {}: {}", index, msg))
            }
            other => other,
        })?;
    }

    Ok(products)
}

/// Review dates are written as RFC 3339; plain `YYYY-MM-DD` dates are
/// accepted on input and read as midnight UTC.
pub(crate) mod review_date {
    use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Ok(timestamp.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .ok_or_else(|| format!("invalid review date '{}'", raw))
    }
}

pub use review_date::parse as parse_review_date;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const CATALOG: &str = r#"[
        {
            "product_id": "ELEC001",
            "name": "Samsung Galaxy S21 Ultra",
            "category": "Electronics",
            "subcategory": "Smartphones",
            "price": 79999,
            "stock": 150,
            "specifications": {"ram": "12GB"},
            "reviews": [
                {"user_id": "U001", "rating": 5, "comment": "Excellent", "date": "2024-01-15"},
                {"user_id": "U002", "rating": 4, "date": "2024-02-01T10:30:00Z"}
            ]
        },
        {
            "product_id": "BOOK001",
            "name": "Clean Code",
            "category": "Books",
            "price": 450.5,
            "stock": 40
        }
    ]"#;

    #[test]
    fn parses_catalog_documents_and_keeps_extra_fields() {
        let products = parse_products(CATALOG).unwrap();
        assert_eq!(products.len(), 2);

        let phone = &products[0];
        assert_eq!(phone.price, 79999.0);
        assert_eq!(phone.reviews.len(), 2);
        assert_eq!(phone.reviews[1].comment, None);
        assert_eq!(phone.attributes["subcategory"], "Smartphones");
        assert_eq!(phone.attributes["specifications"]["ram"], "12GB");
        assert!(!phone.attributes.contains_key("reviews"));

        assert!(products[1].reviews.is_empty());
    }

    #[test]
    fn plain_dates_are_read_as_midnight_utc() {
        let date = parse_review_date("2024-01-15").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));
        assert_eq!(date.hour(), 0);
        assert!(parse_review_date("15/01/2024").is_err());
    }

    #[test]
    fn serialized_product_parses_back_unchanged() {
        let products = parse_products(CATALOG).unwrap();
        let text = serde_json::to_string(&products).unwrap();
        assert_eq!(parse_products(&text).unwrap(), products);
    }

    #[test]
    fn negative_stock_is_a_validation_error() {
        let text = r#"[{"product_id": "X1", "name": "n", "category": "c", "price": 1, "stock": -3}]"#;
        let err = parse_products(text).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)), "{err}");
    }

    #[test]
    fn missing_required_field_is_a_validation_error() {
        let text = r#"[{"product_id": "X1", "category": "c", "price": 1, "stock": 3}]"#;
        let err = parse_products(text).unwrap_err();
        assert!(err.to_string().contains("name"), "{err}");
    }

    #[test]
    fn invalid_document_reports_its_index() {
        let text = r#"[
            {"product_id": "A", "name": "a", "category": "c", "price": 1, "stock": 1},
            {"product_id": "B", "name": "b", "category": "c", "price": -1, "stock": 1}
        ]"#;
        let err = parse_products(text).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("document 1"), "{message}");
        assert!(message.contains("price"), "{message}");
    }

    #[test]
    fn review_rating_must_be_in_range() {
        assert!(Review::new("U1", 4.5, None).validate().is_ok());
        assert!(Review::new("U1", 0.0, None).validate().is_err());
        assert!(Review::new("U1", 6.0, None).validate().is_err());
        assert!(Review::new("U1", f64::NAN, None).validate().is_err());
        assert!(Review::new(" ", 3.0, None).validate().is_err());
    }

    #[test]
    fn invalid_embedded_review_fails_product_validation() {
        let product = Product::new("ELEC009", "Cable", "Electronics", 10.0, 1)
            .with_reviews(vec![Review::new("U1", 9.0, None)]);
        let message = product.validate().unwrap_err().to_string();
        assert!(message.contains("ELEC009"), "{message}");
        assert!(message.contains("review 0"), "{message}");
    }
}
