// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! MongoDB-backed product collection
//!
//! Filters, projections and aggregation pipelines run on the server. The
//! driver's synchronous API is used so this backend has the same blocking
//! call shape as the embedded ones.

use chrono::{SecondsFormat, TimeZone, Utc};
use log::{debug, warn};
use std::collections::HashSet;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::FindOptions;
use mongodb::sync::{Client, Collection};

use super::persistent::StorageDriverError;
use super::{ProductCursor, ProductStore};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{CategoryPriceSummary, Product, ProductSummary, RatedProduct, Review};
use crate::query::{EmptyReviewPolicy, ProductFilter};

/// Server error code for a unique index violation
const DUPLICATE_KEY_CODE: i32 = 11000;

/// `ProductStore` over a MongoDB collection
pub struct MongoProductStore {
    collection: Collection<Document>,
    namespace: String,
}

impl MongoProductStore {
    /// Build a handle to `database.collection`
    ///
    /// The driver connects lazily; an unreachable server is reported by the
    /// first operation as [`CatalogError::Connection`].
    pub fn connect(uri: &str, database: &str, collection: &str) -> CatalogResult<Self> {
        let client = Client::with_uri_str(uri).map_err(driver_error)?;
        Ok(Self {
            collection: client.database(database).collection::<Document>(collection),
            namespace: format!("{}.{}", database, collection),
        })
    }

    /// Fail when any of `ids` is already stored
    fn reject_existing(&self, ids: Vec<String>) -> CatalogResult<()> {
        let existing = self
            .collection
            .find_one(doc! { "product_id": { "$in": ids } }, None)
            .map_err(driver_error)?;

        match existing {
            Some(document) => Err(CatalogError::DuplicateKey {
                product_id: document.get_str("product_id").unwrap_or_default().to_string(),
                committed: 0,
            }),
            None => Ok(()),
        }
    }
}

impl ProductStore for MongoProductStore {
    fn describe(&self) -> String {
        format!("mongo://{}", self.namespace)
    }

    fn insert_many(&self, products: &[Product]) -> CatalogResult<usize> {
        if let Some(product_id) = repeated_id(products) {
            return Err(CatalogError::DuplicateKey {
                product_id: product_id.to_string(),
                committed: 0,
            });
        }
        self.reject_existing(products.iter().map(|p| p.product_id.clone()).collect())?;

        let documents = products
            .iter()
            .map(product_document)
            .collect::<CatalogResult<Vec<_>>>()?;

        // Ordered insert: on failure everything before the failing index is committed
        match self.collection.insert_many(documents, None) {
            Ok(result) => {
                debug!("Inserted {} documents into {}", result.inserted_ids.len(), self.namespace);
                Ok(result.inserted_ids.len())
            }
            Err(err) => {
                if let Some(index) = duplicate_key_index(&err) {
                    warn!(
                        "Bulk insert into {} stopped at document {} on a duplicate key",
                        self.namespace, index
                    );
                    return Err(CatalogError::DuplicateKey {
                        product_id: products
                            .get(index)
                            .map(|p| p.product_id.clone())
                            .unwrap_or_default(),
                        committed: index,
                    });
                }
                Err(driver_error(err))
            }
        }
    }

    fn find(&self, filter: &ProductFilter) -> CatalogResult<ProductCursor<'_>> {
        let options = FindOptions::builder()
            .projection(doc! { "name": 1, "price": 1, "stock": 1, "_id": 0 })
            .build();
        let cursor = self
            .collection
            .find(filter_document(filter), options)
            .map_err(driver_error)?;

        Ok(Box::new(cursor.map(|document| -> CatalogResult<ProductSummary> {
            let document = document.map_err(driver_error)?;
            bson::from_document::<ProductSummary>(document).map_err(decode_error)
        })))
    }

    fn find_rated(
        &self,
        threshold: f64,
        policy: EmptyReviewPolicy,
    ) -> CatalogResult<Vec<RatedProduct>> {
        let cursor = self
            .collection
            .aggregate(rating_pipeline(threshold, policy), None)
            .map_err(driver_error)?;

        let mut rated = Vec::new();
        for document in cursor {
            let mut document = document.map_err(driver_error)?;
            let avg_rating = rating_value(document.remove("avgRating"))?;
            rated.push(RatedProduct {
                product: product_from_document(document)?,
                avg_rating,
            });
        }
        Ok(rated)
    }

    fn push_review(&self, product_id: &str, review: &Review) -> CatalogResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "product_id": product_id },
                doc! { "$push": { "reviews": review_document(review) } },
                None,
            )
            .map_err(driver_error)?;

        if result.matched_count == 0 {
            return Err(CatalogError::NotFound(product_id.to_string()));
        }
        Ok(())
    }

    fn category_price_summary(&self) -> CatalogResult<Vec<CategoryPriceSummary>> {
        let cursor = self
            .collection
            .aggregate(category_price_pipeline(), None)
            .map_err(driver_error)?;

        let mut rows = Vec::new();
        for document in cursor {
            rows.push(category_row(document.map_err(driver_error)?)?);
        }
        Ok(rows)
    }

    fn get(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        self.collection
            .find_one(doc! { "product_id": product_id }, None)
            .map_err(driver_error)?
            .map(product_from_document)
            .transpose()
    }

    fn count(&self) -> CatalogResult<u64> {
        self.collection
            .count_documents(doc! {}, None)
            .map_err(driver_error)
    }
}

/// First `product_id` that occurs twice in the batch
fn repeated_id(products: &[Product]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(products.len());
    products
        .iter()
        .map(|product| product.product_id.as_str())
        .find(|id| !seen.insert(*id))
}

fn driver_error(err: mongodb::error::Error) -> CatalogError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => CatalogError::Connection(err.to_string()),
        ErrorKind::InvalidArgument { .. } => CatalogError::Config(err.to_string()),
        _ => CatalogError::Storage(StorageDriverError::BackendSpecific(err.to_string())),
    }
}

fn decode_error<E: std::fmt::Display>(err: E) -> CatalogError {
    CatalogError::Storage(StorageDriverError::SerializationError(err.to_string()))
}

/// Index of the first document rejected for a duplicate key, if that is why the insert failed
fn duplicate_key_index(err: &mongodb::error::Error) -> Option<usize> {
    match err.kind.as_ref() {
        ErrorKind::BulkWrite(failure) => failure
            .write_errors
            .as_ref()?
            .iter()
            .filter(|e| e.code == DUPLICATE_KEY_CODE)
            .map(|e| e.index)
            .min(),
        _ => None,
    }
}

fn filter_document(filter: &ProductFilter) -> Document {
    let mut document = Document::new();
    if let Some(category) = &filter.category {
        document.insert("category", category.as_str());
    }
    if let Some(ceiling) = filter.price_below {
        document.insert("price", doc! { "$lt": ceiling });
    }
    document
}

/// `$addFields` the average rating, then `$match` on it
fn rating_pipeline(threshold: f64, policy: EmptyReviewPolicy) -> Vec<Document> {
    let average = doc! { "$avg": "$reviews.rating" };
    let avg_rating = match policy {
        EmptyReviewPolicy::Zero => Bson::Document(doc! { "$ifNull": [average, 0.0] }),
        _ => Bson::Document(average),
    };
    let matcher = match policy {
        EmptyReviewPolicy::IncludeUnrated => doc! {
            "$or": [
                { "avgRating": { "$gte": threshold } },
                { "avgRating": Bson::Null },
            ]
        },
        _ => doc! { "avgRating": { "$gte": threshold } },
    };

    vec![
        doc! { "$addFields": { "avgRating": avg_rating } },
        doc! { "$match": matcher },
    ]
}

fn category_price_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$category",
                "avg_price": { "$avg": "$price" },
                "product_count": { "$sum": 1 },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "category": "$_id",
                "avg_price": 1,
                "product_count": 1,
            }
        },
        doc! { "$sort": { "avg_price": -1 } },
    ]
}

fn number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Decimal128(v) => v.to_string().parse().ok(),
        _ => None,
    }
}

fn required_number(document: &Document, field: &str) -> CatalogResult<f64> {
    document
        .get(field)
        .and_then(number)
        .ok_or_else(|| decode_error(format!("field `{}` is missing or not numeric", field)))
}

/// Null is a legitimate average only for unreviewed products
fn rating_value(value: Option<Bson>) -> CatalogResult<Option<f64>> {
    match value {
        None | Some(Bson::Null) => Ok(None),
        Some(value) => number(&value)
            .map(Some)
            .ok_or_else(|| decode_error(format!("avgRating is not numeric: {}", value))),
    }
}

fn category_row(document: Document) -> CatalogResult<CategoryPriceSummary> {
    let category = document
        .get_str("category")
        .map_err(|e| decode_error(format!("category: {}", e)))?;
    Ok(CategoryPriceSummary {
        category: category.to_string(),
        avg_price: required_number(&document, "avg_price")?,
        product_count: required_number(&document, "product_count")? as u64,
    })
}

fn review_document(review: &Review) -> Document {
    let mut document = doc! {
        "user_id": review.user_id.as_str(),
        "rating": review.rating,
        "date": bson::DateTime::from_millis(review.date.timestamp_millis()),
    };
    if let Some(comment) = &review.comment {
        document.insert("comment", comment.as_str());
    }
    document
}

/// Encode a product with review dates as native BSON datetimes
fn product_document(product: &Product) -> CatalogResult<Document> {
    let mut document = bson::to_document(product).map_err(decode_error)?;
    let reviews: Vec<Bson> = product
        .reviews
        .iter()
        .map(|review| Bson::Document(review_document(review)))
        .collect();
    document.insert("reviews", reviews);
    Ok(document)
}

/// Decode a stored document, accepting native or string review dates
fn product_from_document(mut document: Document) -> CatalogResult<Product> {
    document.remove("_id");

    if let Some(Bson::Array(reviews)) = document.get_mut("reviews") {
        for review in reviews.iter_mut() {
            if let Bson::Document(review) = review {
                let rendered = match review.get("date") {
                    Some(Bson::DateTime(date)) => Utc
                        .timestamp_millis_opt(date.timestamp_millis())
                        .single()
                        .map(|date| date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
                    _ => None,
                };
                if let Some(rendered) = rendered {
                    review.insert("date", rendered);
                }
            }
        }
    }

    bson::from_document(document).map_err(decode_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reviewed_product() -> Product {
        let mut review = Review::new("U001", 5.0, Some("Excellent".to_string()));
        review.date = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        Product::new("ELEC001", "Galaxy S21", "Electronics", 79999.0, 150).with_reviews(vec![review])
    }

    #[test]
    fn filter_translates_to_query_document() {
        assert_eq!(
            filter_document(&ProductFilter::discounted_electronics()),
            doc! { "category": "Electronics", "price": { "$lt": 50000.0 } }
        );
        assert_eq!(filter_document(&ProductFilter::new()), doc! {});
    }

    #[test]
    fn review_dates_are_stored_as_bson_datetimes() {
        let document = product_document(&reviewed_product()).unwrap();
        let reviews = document.get_array("reviews").unwrap();
        let review = reviews[0].as_document().unwrap();
        assert!(matches!(review.get("date"), Some(Bson::DateTime(_))));
        assert_eq!(review.get_str("comment").unwrap(), "Excellent");
    }

    #[test]
    fn stored_document_decodes_to_the_same_product() {
        let product = reviewed_product();
        let mut document = product_document(&product).unwrap();
        document.insert("_id", bson::oid::ObjectId::new());

        assert_eq!(product_from_document(document).unwrap(), product);
    }

    #[test]
    fn rating_pipeline_derives_before_matching() {
        let pipeline = rating_pipeline(4.0, EmptyReviewPolicy::Exclude);
        assert_eq!(pipeline.len(), 2);
        assert!(pipeline[0].contains_key("$addFields"));
        assert!(pipeline[1].contains_key("$match"));
    }

    #[test]
    fn zero_policy_defaults_missing_average() {
        let pipeline = rating_pipeline(4.0, EmptyReviewPolicy::Zero);
        let added = pipeline[0].get_document("$addFields").unwrap();
        assert!(added.get_document("avgRating").unwrap().contains_key("$ifNull"));
    }

    #[test]
    fn category_pipeline_sorts_descending() {
        let pipeline = category_price_pipeline();
        assert_eq!(
            pipeline.last().unwrap(),
            &doc! { "$sort": { "avg_price": -1 } }
        );
    }

    #[test]
    fn repeated_id_finds_first_collision() {
        let batch = vec![
            Product::new("A", "a", "Toys", 1.0, 1),
            Product::new("B", "b", "Toys", 1.0, 1),
            Product::new("A", "c", "Toys", 1.0, 1),
        ];
        assert_eq!(repeated_id(&batch), Some("A"));
        assert_eq!(repeated_id(&batch[..2]), None);
    }

    #[test]
    fn category_row_accepts_decimal_averages() {
        let row = category_row(doc! {
            "category": "Electronics",
            "avg_price": Bson::Decimal128("49999.99".parse().unwrap()),
            "product_count": 2,
        })
        .unwrap();
        assert_eq!(row.avg_price, 49999.99);
        assert_eq!(row.product_count, 2);
    }

    #[test]
    fn category_row_rejects_null_fields() {
        let err = category_row(doc! {
            "category": Bson::Null,
            "avg_price": Bson::Null,
            "product_count": 1,
        })
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Storage(StorageDriverError::SerializationError(_))
        ));

        let err = category_row(doc! { "category": "Books", "avg_price": Bson::Null, "product_count": 1 })
            .unwrap_err();
        assert!(err.to_string().contains("avg_price"), "{err}");
    }

    #[test]
    fn rating_value_keeps_null_and_rejects_garbage() {
        assert_eq!(rating_value(None).unwrap(), None);
        assert_eq!(rating_value(Some(Bson::Null)).unwrap(), None);
        assert_eq!(rating_value(Some(Bson::Int32(4))).unwrap(), Some(4.0));
        assert!(rating_value(Some(Bson::String("high".to_string()))).is_err());
    }

    #[test]
    fn numbers_accept_every_numeric_bson_type() {
        assert_eq!(number(&Bson::Int32(2)), Some(2.0));
        assert_eq!(number(&Bson::Int64(3)), Some(3.0));
        assert_eq!(number(&Bson::Double(4.5)), Some(4.5));
        assert_eq!(number(&Bson::Null), None);
    }
}
