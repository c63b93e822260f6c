// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled storage driver implementation

use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::Path;

use super::types::{backend, key_label, StorageDriverError, StorageResult};
use super::{StorageDriver, StorageTree, TreeIter};

/// Sled driver implementation
pub struct SledDriver {
    db: sled::Db,
}

/// Sled tree wrapper that implements the StorageTree trait
pub struct SledTree {
    tree: sled::Tree,
}

fn unwrap_transaction<T>(result: Result<T, TransactionError<StorageDriverError>>) -> StorageResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(TransactionError::Abort(e)) => Err(e),
        Err(TransactionError::Storage(e)) => Err(backend(e)),
    }
}

impl StorageTree for SledTree {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let value = self.tree.get(key).map_err(backend)?;
        Ok(value.map(|ivec| ivec.to_vec()))
    }

    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        Ok(Box::new(self.tree.iter().map(|result| {
            result
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(backend)
        })))
    }

    fn insert_new_batch(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()> {
        let result = self.tree.transaction(|tx| {
            for (key, value) in entries {
                if tx.get(*key)?.is_some() {
                    return Err(ConflictableTransactionError::Abort(
                        StorageDriverError::KeyExists(key_label(key)),
                    ));
                }
                tx.insert(*key, *value)?;
            }
            Ok(())
        });
        unwrap_transaction(result)
    }

    fn update(
        &self,
        key: &[u8],
        apply: &dyn Fn(&[u8]) -> StorageResult<Vec<u8>>,
    ) -> StorageResult<bool> {
        let result = self.tree.transaction(|tx| {
            let current = match tx.get(key)? {
                Some(current) => current,
                None => return Ok(false),
            };
            let next = apply(&current).map_err(ConflictableTransactionError::Abort)?;
            tx.insert(key, next)?;
            Ok(true)
        });
        unwrap_transaction(result)
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.tree.len())
    }

    fn flush(&self) -> StorageResult<()> {
        self.tree.flush().map_err(backend)?;
        Ok(())
    }
}

impl StorageDriver for SledDriver {
    type Tree = SledTree;

    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        // A second process holding the directory lock surfaces here
        let db = sled::open(path.as_ref())
            .map_err(|e| StorageDriverError::Unavailable(format!("{:?}: {}", path.as_ref(), e)))?;
        Ok(SledDriver { db })
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let tree = self.db.open_tree(name).map_err(backend)?;
        Ok(SledTree { tree })
    }
}
