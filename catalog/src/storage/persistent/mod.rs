// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Embedded key/value drivers
//!
//! Each driver exposes named trees. A collection maps onto one tree keyed by
//! `product_id` with JSON-encoded documents as values.

pub mod memory;
#[cfg(feature = "redb-backend")]
pub mod redb;
#[cfg(feature = "sled-backend")]
pub mod sled;
pub mod types;

use log::debug;
use std::path::Path;

pub use types::{StorageDriverError, StorageResult, StorageType};

/// Lazy iterator over `(key, value)` pairs of a tree
pub type TreeIter<'a> = Box<dyn Iterator<Item = StorageResult<(Vec<u8>, Vec<u8>)>> + 'a>;

/// One named key/value tree inside a driver
pub trait StorageTree: Send + Sync {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Iterate every entry in key order
    fn iter(&self) -> StorageResult<TreeIter<'_>>;

    /// Insert all entries in one transaction
    ///
    /// Fails with [`StorageDriverError::KeyExists`] and writes nothing if any
    /// key is already present.
    fn insert_new_batch(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()>;

    /// Atomically replace the value under `key` with `apply(current)`
    ///
    /// Returns `false` without writing when the key is absent.
    fn update(
        &self,
        key: &[u8],
        apply: &dyn Fn(&[u8]) -> StorageResult<Vec<u8>>,
    ) -> StorageResult<bool>;

    fn len(&self) -> StorageResult<usize>;

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    fn flush(&self) -> StorageResult<()>;
}

/// A storage engine that hands out named trees
pub trait StorageDriver: Sized {
    type Tree: StorageTree + 'static;

    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>;

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree>;
}

/// Open the tree backing `collection` in `database` for an embedded backend
///
/// Sled keeps one directory per database under `root`, redb one file.
pub fn open_tree(
    storage_type: StorageType,
    root: &Path,
    database: &str,
    collection: &str,
) -> StorageResult<Box<dyn StorageTree>> {
    debug!(
        "Opening {} tree '{}' in database '{}' under {:?}",
        storage_type, collection, database, root
    );

    match storage_type {
        StorageType::Memory => {
            let driver = memory::MemoryDriver::open(root)?;
            Ok(Box::new(driver.open_tree(collection)?))
        }
        StorageType::Sled => open_sled(&root.join(database), collection),
        StorageType::Redb => open_redb(&root.join(format!("{}.redb", database)), collection),
        StorageType::Mongo => Err(StorageDriverError::Unsupported(
            "mongo is a document store, not an embedded key/value driver".to_string(),
        )),
    }
}

#[cfg(feature = "sled-backend")]
fn open_sled(dir: &Path, collection: &str) -> StorageResult<Box<dyn StorageTree>> {
    let driver = sled::SledDriver::open(dir)?;
    Ok(Box::new(driver.open_tree(collection)?))
}

#[cfg(not(feature = "sled-backend"))]
fn open_sled(_dir: &Path, _collection: &str) -> StorageResult<Box<dyn StorageTree>> {
    Err(StorageDriverError::Unsupported(
        "built without the `sled-backend` feature".to_string(),
    ))
}

#[cfg(feature = "redb-backend")]
fn open_redb(file: &Path, collection: &str) -> StorageResult<Box<dyn StorageTree>> {
    let driver = redb::RedbDriver::open(file)?;
    Ok(Box::new(driver.open_tree(collection)?))
}

#[cfg(not(feature = "redb-backend"))]
fn open_redb(_file: &Path, _collection: &str) -> StorageResult<Box<dyn StorageTree>> {
    Err(StorageDriverError::Unsupported(
        "built without the `redb-backend` feature".to_string(),
    ))
}
