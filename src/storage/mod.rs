// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Key-Value Storage Module
//!
//! Identity records live in a flat key-value store scoped to one wallet
//! profile. Callers depend on the [`KeyValueStore`] trait, never on a
//! concrete backend, so the login flow, the name editor and the tests can all
//! share or substitute the same store.
//!
//! ## Backends
//!
//! - [`InMemoryStore`] - process-local map, used by tests and ephemeral sessions
//! - [`KvDatabase`] - redb file under `DATA_DIR`, survives restarts
//!
//! ## Key Layout
//!
//! ```text
//! login_<lowercased address>       # LoginAttestation (JSON)
//! signedName_<lowercased address>  # SignedBinding (JSON)
//! ```
//!
//! Writes are last-writer-wins. There is no versioning: every write is
//! user-initiated and serialized by the session's signing gate.

pub mod keys;
pub mod kv_database;
pub mod memory;
pub mod paths;
pub mod repository;

pub use kv_database::KvDatabase;
pub use memory::InMemoryStore;
pub use paths::StoragePaths;
pub use repository::{AttestationRepository, BindingRepository, LoginAttestation, SignedBinding};

/// Error type for key-value storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A thread panicked while holding the in-memory store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Flat string key-value store with `get/set/remove` semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}
