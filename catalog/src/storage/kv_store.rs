// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Product collection over an embedded key/value tree
//!
//! Documents are stored as JSON under their `product_id`. Filters and
//! aggregations run in process over a full scan of the tree.

use log::debug;
use std::collections::HashSet;

use super::persistent::{StorageResult, StorageTree, StorageType};
use super::{ProductCursor, ProductStore};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{CategoryPriceSummary, Product, ProductSummary, RatedProduct, Review};
use crate::query::{rate_products, CategoryPriceAccumulator, EmptyReviewPolicy, ProductFilter};

/// `ProductStore` backed by any embedded `StorageTree`
pub struct KvProductStore {
    tree: Box<dyn StorageTree>,
    storage_type: StorageType,
    namespace: String,
}

impl KvProductStore {
    pub fn new(
        tree: Box<dyn StorageTree>,
        storage_type: StorageType,
        database: &str,
        collection: &str,
    ) -> Self {
        Self {
            tree,
            storage_type,
            namespace: format!("{}.{}", database, collection),
        }
    }

    fn decode(bytes: &[u8]) -> CatalogResult<Product> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Lazily decode every stored product
    fn scan(&self) -> CatalogResult<impl Iterator<Item = CatalogResult<Product>> + '_> {
        let entries = self.tree.iter()?;
        Ok(entries.map(|entry| {
            let (_, value) = entry?;
            Self::decode(&value)
        }))
    }
}

impl ProductStore for KvProductStore {
    fn describe(&self) -> String {
        format!("{}://{}", self.storage_type, self.namespace)
    }

    fn insert_many(&self, products: &[Product]) -> CatalogResult<usize> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in products {
            if !seen.insert(product.product_id.as_str()) {
                return Err(CatalogError::DuplicateKey {
                    product_id: product.product_id.clone(),
                    committed: 0,
                });
            }
        }

        let encoded = products
            .iter()
            .map(|product| -> CatalogResult<(&[u8], Vec<u8>)> {
                Ok((product.product_id.as_bytes(), serde_json::to_vec(product)?))
            })
            .collect::<CatalogResult<Vec<_>>>()?;
        let entries: Vec<(&[u8], &[u8])> = encoded
            .iter()
            .map(|(key, value)| (*key, value.as_slice()))
            .collect();

        self.tree.insert_new_batch(&entries)?;
        self.tree.flush()?;

        debug!("Inserted {} documents into {}", entries.len(), self.namespace);
        Ok(entries.len())
    }

    fn find(&self, filter: &ProductFilter) -> CatalogResult<ProductCursor<'_>> {
        let filter = filter.clone();
        let matches = self.scan()?.filter_map(move |product| match product {
            Ok(product) if filter.matches(&product) => Some(Ok(ProductSummary::from(&product))),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        });
        Ok(Box::new(matches))
    }

    fn find_rated(
        &self,
        threshold: f64,
        policy: EmptyReviewPolicy,
    ) -> CatalogResult<Vec<RatedProduct>> {
        let products = self.scan()?.collect::<CatalogResult<Vec<_>>>()?;
        Ok(rate_products(products, threshold, policy))
    }

    fn push_review(&self, product_id: &str, review: &Review) -> CatalogResult<()> {
        let append = |current: &[u8]| -> StorageResult<Vec<u8>> {
            let mut product: Product = serde_json::from_slice(current)?;
            product.reviews.push(review.clone());
            Ok(serde_json::to_vec(&product)?)
        };

        if !self.tree.update(product_id.as_bytes(), &append)? {
            return Err(CatalogError::NotFound(product_id.to_string()));
        }
        self.tree.flush()?;
        Ok(())
    }

    fn category_price_summary(&self) -> CatalogResult<Vec<CategoryPriceSummary>> {
        let mut groups = CategoryPriceAccumulator::new();
        for product in self.scan()? {
            groups.add(&product?);
        }
        Ok(groups.finish())
    }

    fn get(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        self.tree
            .get(product_id.as_bytes())?
            .map(|bytes| Self::decode(&bytes))
            .transpose()
    }

    fn count(&self) -> CatalogResult<u64> {
        Ok(self.tree.len()? as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::persistent::memory::MemoryDriver;
    use crate::storage::persistent::StorageDriver;

    fn store() -> KvProductStore {
        let tree = MemoryDriver::default().open_tree("products").unwrap();
        KvProductStore::new(Box::new(tree), StorageType::Memory, "FlexiMartDB", "products")
    }

    #[test]
    fn describe_names_backend_and_namespace() {
        assert_eq!(store().describe(), "memory://FlexiMartDB.products");
    }

    #[test]
    fn repeated_id_in_batch_is_rejected_before_writing() {
        let store = store();
        let batch = vec![
            Product::new("A1", "a", "Books", 1.0, 1),
            Product::new("A1", "b", "Books", 2.0, 1),
        ];
        let err = store.insert_many(&batch).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateKey { ref product_id, committed: 0 } if product_id == "A1"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn get_returns_stored_document() {
        let store = store();
        let product = Product::new("B1", "Dune", "Books", 399.0, 12);
        store.insert_many(std::slice::from_ref(&product)).unwrap();

        assert_eq!(store.get("B1").unwrap(), Some(product));
        assert_eq!(store.get("B2").unwrap(), None);
    }

    #[test]
    fn corrupt_document_surfaces_as_serialization_error() {
        let tree = MemoryDriver::default().open_tree("products").unwrap();
        tree.insert_new_batch(&[(b"BAD".as_slice(), b"not json".as_slice())])
            .unwrap();
        let store =
            KvProductStore::new(Box::new(tree), StorageType::Memory, "FlexiMartDB", "products");

        let results: Vec<_> = store.find(&ProductFilter::new()).unwrap().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(CatalogError::Serialization(_))));
    }
}
