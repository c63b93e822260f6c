//! Shared fixtures for catalog integration tests

#![allow(dead_code)]

use fleximart_catalog::{CatalogConfig, CatalogService, EmptyReviewPolicy, StorageType};
use tempfile::TempDir;

/// Small catalog in the import format: two discounted electronics, one
/// expensive phone, a book with mixed reviews and an unreviewed book.
pub const SAMPLE_CATALOG: &str = r#"[
    {
        "product_id": "ELEC001",
        "name": "Galaxy S21 Ultra",
        "category": "Electronics",
        "subcategory": "Smartphones",
        "price": 79999,
        "stock": 150,
        "reviews": [
            {"user_id": "U001", "rating": 5, "comment": "Excellent", "date": "2024-01-15"},
            {"user_id": "U002", "rating": 4, "date": "2024-02-01T10:30:00Z"}
        ]
    },
    {
        "product_id": "ELEC002",
        "name": "Noise Cancelling Headphones",
        "category": "Electronics",
        "price": 24999,
        "stock": 75,
        "reviews": [
            {"user_id": "U003", "rating": 3, "date": "2024-01-20"}
        ]
    },
    {
        "product_id": "ELEC003",
        "name": "Smart Watch",
        "category": "Electronics",
        "price": 49999.99,
        "stock": 30,
        "reviews": []
    },
    {
        "product_id": "BOOK001",
        "name": "Clean Code",
        "category": "Books",
        "price": 450,
        "stock": 40,
        "tags": ["programming"],
        "reviews": [
            {"user_id": "U004", "rating": 4, "date": "2024-03-01"},
            {"user_id": "U005", "rating": 4.5, "date": "2024-03-02"}
        ]
    },
    {
        "product_id": "BOOK002",
        "name": "Dune",
        "category": "Books",
        "price": 399,
        "stock": 12
    }
]"#;

/// A catalog service over a throwaway database
pub struct CatalogFixture {
    temp_dir: TempDir,
    config: CatalogConfig,
    pub service: CatalogService,
}

impl CatalogFixture {
    pub fn empty(storage: StorageType) -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let config = CatalogConfig {
            storage,
            path: temp_dir.path().to_path_buf(),
            ..CatalogConfig::default()
        };
        let service = CatalogService::open(&config)?;
        Ok(Self {
            temp_dir,
            config,
            service,
        })
    }

    pub fn with_sample_data(storage: StorageType) -> Result<Self, Box<dyn std::error::Error>> {
        let fixture = Self::empty(storage)?;
        fixture.service.load_json(SAMPLE_CATALOG)?;
        Ok(fixture)
    }

    /// Service over the same store with a different empty-review policy
    pub fn with_policy(&self, policy: EmptyReviewPolicy) -> CatalogService {
        self.service.clone().with_empty_review_policy(policy)
    }

    /// Drop the open handle and open the database again from disk
    pub fn reopen(self) -> Result<Self, Box<dyn std::error::Error>> {
        let Self {
            temp_dir,
            config,
            service,
        } = self;
        drop(service);

        let service = CatalogService::open(&config)?;
        Ok(Self {
            temp_dir,
            config,
            service,
        })
    }

    pub fn path(&self) -> &std::path::Path {
        self.temp_dir.path()
    }
}

/// Backends every behavioural test runs against
pub fn embedded_backends() -> Vec<StorageType> {
    vec![StorageType::Memory, StorageType::Sled, StorageType::Redb]
}
