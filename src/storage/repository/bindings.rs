// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed display-name binding repository.
//!
//! One record per address under `signedName_<lowercased address>`. A new
//! name replaces the record; records are never edited in place.

use serde::{Deserialize, Serialize};

use super::super::{keys, KeyValueStore, StorageResult};
use crate::models::WalletAddress;

/// Display name bound to a wallet address by a personal-message signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedBinding {
    /// User-chosen display name (non-empty)
    pub name: String,
    /// 0x-prefixed hex signature over the canonical name message
    pub signature: String,
    /// Address exactly as it was signed (original casing)
    pub address: WalletAddress,
    /// Milliseconds since the Unix epoch, embedded in the signed message
    pub timestamp: i64,
}

/// Repository for raw binding records.
pub struct BindingRepository<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> BindingRepository<'a, S> {
    /// Create a new BindingRepository.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Read the raw stored string for an address.
    pub fn get_raw(&self, address: &WalletAddress) -> StorageResult<Option<String>> {
        self.store.get(&keys::signed_name(address))
    }

    /// Read and decode the binding for an address.
    ///
    /// Decoding failures are returned as `StorageError::Json`.
    pub fn get(&self, address: &WalletAddress) -> StorageResult<Option<SignedBinding>> {
        match self.get_raw(address)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Write a binding, replacing any existing record for the same address.
    pub fn put(&self, binding: &SignedBinding) -> StorageResult<()> {
        let json = serde_json::to_string(binding)?;
        self.store.set(&keys::signed_name(&binding.address), &json)
    }

    /// Delete the binding for an address.
    pub fn delete(&self, address: &WalletAddress) -> StorageResult<()> {
        self.store.remove(&keys::signed_name(address))
    }
}
