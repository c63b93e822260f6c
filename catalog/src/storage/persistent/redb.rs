// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! REDB storage driver implementation

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::types::{backend, key_label, StorageDriverError, StorageResult};
use super::{StorageDriver, StorageTree, TreeIter};

/// REDB driver implementation
pub struct RedbDriver {
    db: Arc<Database>,
}

/// REDB tree wrapper that implements StorageTree trait
/// In REDB, each "tree" is actually a separate table in the database
pub struct RedbTree {
    db: Arc<Database>,
    table_name: String,
}

impl RedbTree {
    fn table_def(&self) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
        TableDefinition::new(&self.table_name)
    }
}

impl StorageTree for RedbTree {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read().map_err(backend)?;
        let table = read_txn.open_table(self.table_def()).map_err(backend)?;

        let result = table.get(key).map_err(backend)?;
        Ok(result.map(|guard| guard.value().to_vec()))
    }

    fn iter(&self) -> StorageResult<TreeIter<'_>> {
        // REDB's iterators are tied to transactions, so entries are collected
        // into memory before the transaction closes
        let read_txn = self.db.begin_read().map_err(backend)?;
        let table = read_txn.open_table(self.table_def()).map_err(backend)?;

        let items: Vec<StorageResult<(Vec<u8>, Vec<u8>)>> = table
            .iter()
            .map_err(backend)?
            .map(|result| {
                result
                    .map(|(k, v)| (k.value().to_vec(), v.value().to_vec()))
                    .map_err(backend)
            })
            .collect();

        Ok(Box::new(items.into_iter()))
    }

    fn insert_new_batch(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()> {
        let write_txn = self.db.begin_write().map_err(backend)?;

        let conflict = {
            let mut table = write_txn.open_table(self.table_def()).map_err(backend)?;

            let mut conflict = None;
            for (key, value) in entries {
                if table.get(*key).map_err(backend)?.is_some() {
                    conflict = Some(key_label(key));
                    break;
                }
                table.insert(*key, *value).map_err(backend)?;
            }
            conflict
        };

        if let Some(key) = conflict {
            write_txn.abort().map_err(backend)?;
            return Err(StorageDriverError::KeyExists(key));
        }

        write_txn.commit().map_err(backend)?;
        Ok(())
    }

    fn update(
        &self,
        key: &[u8],
        apply: &dyn Fn(&[u8]) -> StorageResult<Vec<u8>>,
    ) -> StorageResult<bool> {
        let write_txn = self.db.begin_write().map_err(backend)?;

        let updated = {
            let mut table = write_txn.open_table(self.table_def()).map_err(backend)?;

            let current = table
                .get(key)
                .map_err(backend)?
                .map(|guard| guard.value().to_vec());

            match current {
                Some(current) => {
                    let next = apply(&current)?;
                    table.insert(key, next.as_slice()).map_err(backend)?;
                    true
                }
                None => false,
            }
        };

        if updated {
            write_txn.commit().map_err(backend)?;
        } else {
            write_txn.abort().map_err(backend)?;
        }
        Ok(updated)
    }

    fn len(&self) -> StorageResult<usize> {
        let read_txn = self.db.begin_read().map_err(backend)?;
        let table = read_txn.open_table(self.table_def()).map_err(backend)?;

        let len = table.len().map_err(backend)?;
        Ok(len as usize)
    }

    fn flush(&self) -> StorageResult<()> {
        // Every committed write transaction is already durable
        Ok(())
    }
}

impl StorageDriver for RedbDriver {
    type Tree = RedbTree;

    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        // REDB requires a file path, not a directory
        let db_path = if path.as_ref().is_dir() {
            path.as_ref().join("catalog.redb")
        } else {
            path.as_ref().to_path_buf()
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(&db_path)
            .map_err(|e| StorageDriverError::Unavailable(format!("{:?}: {}", db_path, e)))?;

        Ok(RedbDriver { db: Arc::new(db) })
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        // Tables only exist once a write transaction has opened them
        let write_txn = self.db.begin_write().map_err(backend)?;

        {
            let table_def: TableDefinition<&[u8], &[u8]> = TableDefinition::new(name);
            write_txn.open_table(table_def).map_err(backend)?;
        }

        write_txn.commit().map_err(backend)?;

        Ok(RedbTree {
            db: self.db.clone(),
            table_name: name.to_string(),
        })
    }
}
