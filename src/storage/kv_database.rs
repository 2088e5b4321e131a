// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded key-value database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `kv`: storage key → JSON record string

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

use super::{KeyValueStore, StorageResult};

/// Single table holding every record, keyed as described in [`super::keys`].
const KV: TableDefinition<&str, &str> = TableDefinition::new("kv");

/// redb-backed [`KeyValueStore`].
pub struct KvDatabase {
    db: Database,
}

impl KvDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(KV)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Key-value database opened");
        Ok(Self { db })
    }
}

impl KeyValueStore for KvDatabase {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV)?;
        match table.get(key)? {
            Some(value) => Ok(Some(value.value().to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
