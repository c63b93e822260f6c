// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory storage driver implementation

use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use super::types::{key_label, StorageDriverError, StorageResult};
use super::{StorageDriver, StorageTree, TreeIter};

/// Memory driver; trees live as long as any handle to them
#[derive(Default)]
pub struct MemoryDriver {
    trees: Mutex<HashMap<String, MemoryTree>>,
}

/// Ordered in-memory tree; clones share the same data
#[derive(Clone, Default)]
pub struct MemoryTree {
    entries: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl StorageTree for MemoryTree {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        // Snapshot so readers never hold the lock across caller code
        let snapshot: Vec<StorageResult<(Vec<u8>, Vec<u8>)>> = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Ok(Box::new(snapshot.into_iter()))
    }

    fn insert_new_batch(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()> {
        let mut tree = self.entries.write();

        if let Some((key, _)) = entries.iter().find(|(key, _)| tree.contains_key(*key)) {
            return Err(StorageDriverError::KeyExists(key_label(key)));
        }

        for (key, value) in entries {
            tree.insert(key.to_vec(), value.to_vec());
        }
        Ok(())
    }

    fn update(
        &self,
        key: &[u8],
        apply: &dyn Fn(&[u8]) -> StorageResult<Vec<u8>>,
    ) -> StorageResult<bool> {
        let mut tree = self.entries.write();
        match tree.get_mut(key) {
            Some(current) => {
                *current = apply(current)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.entries.read().len())
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageDriver for MemoryDriver {
    type Tree = MemoryTree;

    fn open<P: AsRef<Path>>(_path: P) -> StorageResult<Self> {
        Ok(Self::default())
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        Ok(self.trees.lock().entry(name.to_string()).or_default().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MemoryTree {
        MemoryDriver::open("unused").unwrap().open_tree("products").unwrap()
    }

    fn entry<'a>(key: &'a [u8], value: &'a [u8]) -> (&'a [u8], &'a [u8]) {
        (key, value)
    }

    #[test]
    fn batch_insert_is_all_or_nothing() {
        let tree = tree();
        tree.insert_new_batch(&[entry(b"A", b"1")]).unwrap();

        let err = tree
            .insert_new_batch(&[entry(b"B", b"2"), entry(b"A", b"3")])
            .unwrap_err();
        assert!(matches!(err, StorageDriverError::KeyExists(ref key) if key == "A"));
        assert!(!tree.contains_key(b"B").unwrap());
        assert_eq!(tree.get(b"A").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn update_reports_missing_keys() {
        let tree = tree();
        tree.insert_new_batch(&[entry(b"A", b"1")]).unwrap();

        let append = |current: &[u8]| -> StorageResult<Vec<u8>> {
            let mut next = current.to_vec();
            next.push(b'+');
            Ok(next)
        };
        assert!(tree.update(b"A", &append).unwrap());
        assert!(!tree.update(b"Z", &append).unwrap());
        assert_eq!(tree.get(b"A").unwrap(), Some(b"1+".to_vec()));
        assert_eq!(tree.len().unwrap(), 1);
    }

    #[test]
    fn same_name_shares_data_within_a_driver() {
        let driver = MemoryDriver::default();
        let first = driver.open_tree("products").unwrap();
        let second = driver.open_tree("products").unwrap();
        first.insert_new_batch(&[entry(b"K", b"V")]).unwrap();
        assert!(second.contains_key(b"K").unwrap());
        assert!(driver.open_tree("other").unwrap().is_empty().unwrap());
    }
}
