// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login attestation repository.
//!
//! One record per address under `login_<lowercased address>`, written the
//! first time the address connects without one.

use serde::{Deserialize, Serialize};

use super::super::{keys, KeyValueStore, StorageResult};
use crate::models::WalletAddress;

/// Signed record of a wallet login event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginAttestation {
    /// Address that signed, as connected
    pub address: WalletAddress,
    /// 0x-prefixed hex signature over `message`
    pub signature: String,
    /// Exact message text that was signed
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Repository for login attestation records.
pub struct AttestationRepository<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> AttestationRepository<'a, S> {
    /// Create a new AttestationRepository.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Check if an attestation exists for an address.
    pub fn exists(&self, address: &WalletAddress) -> StorageResult<bool> {
        Ok(self.store.get(&keys::login(address))?.is_some())
    }

    /// Get the attestation for an address.
    pub fn get(&self, address: &WalletAddress) -> StorageResult<Option<LoginAttestation>> {
        match self.store.get(&keys::login(address))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Store an attestation, replacing any previous one.
    pub fn put(&self, attestation: &LoginAttestation) -> StorageResult<()> {
        let json = serde_json::to_string(attestation)?;
        self.store.set(&keys::login(&attestation.address), &json)
    }

    /// Delete the attestation for an address.
    pub fn delete(&self, address: &WalletAddress) -> StorageResult<()> {
        self.store.remove(&keys::login(address))
    }
}
