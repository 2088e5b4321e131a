// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed display-name bindings.
//!
//! A binding is trusted only while its signature recovers to the address it
//! claims. [`IdentityBinder::load`] re-verifies on every read and deletes
//! records that fail, so a tampered or corrupt entry disappears the first
//! time anything looks at it.

use std::sync::Arc;

use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

use super::message::name_message;
use super::signature::{request_signature, verify};
use crate::blockchain::MessageSigner;
use crate::error::IdentityError;
use crate::models::WalletAddress;
use crate::storage::{BindingRepository, KeyValueStore, SignedBinding, StorageError, StorageResult};

/// Longest display name accepted, in characters after normalization.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 64;

/// Trim and NFC-normalize a user-entered name.
///
/// Normalizing before signing keeps visually identical names byte-identical
/// in the signed message.
pub fn normalize_name(raw: &str, max_len: usize) -> Result<String, IdentityError> {
    let name: String = raw.trim().nfc().collect();
    if name.is_empty() {
        return Err(IdentityError::EmptyName);
    }
    if name.chars().count() > max_len {
        return Err(IdentityError::NameTooLong { max: max_len });
    }
    Ok(name)
}

/// Creates, verifies, loads and removes signed display-name bindings.
pub struct IdentityBinder<S: KeyValueStore> {
    store: Arc<S>,
    max_name_length: usize,
}

impl<S: KeyValueStore> Clone for IdentityBinder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            max_name_length: self.max_name_length,
        }
    }
}

impl<S: KeyValueStore> IdentityBinder<S> {
    /// Create a binder over `store` with the default name length limit.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
        }
    }

    /// Override the maximum display name length.
    pub fn with_max_name_length(mut self, max_name_length: usize) -> Self {
        self.max_name_length = max_name_length;
        self
    }

    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// Canonical message binding `name` to `address` at `timestamp`.
    pub fn build_message(name: &str, address: &WalletAddress, timestamp: i64) -> String {
        name_message(name, address, timestamp)
    }

    /// Sign, verify and persist a new binding for `address`.
    ///
    /// The name is normalized first; an empty name fails before any prompt
    /// is shown. The signature is checked against `address` before anything
    /// is written, so a wallet signing with a different key leaves storage
    /// untouched.
    pub async fn bind<W: MessageSigner>(
        &self,
        raw_name: &str,
        address: &WalletAddress,
        timestamp: i64,
        signer: Option<&W>,
    ) -> Result<SignedBinding, IdentityError> {
        let name = normalize_name(raw_name, self.max_name_length)?;
        let message = Self::build_message(&name, address, timestamp);
        let signature = request_signature(&message, signer).await?;

        if !verify(&message, &signature, address) {
            warn!(address = %address, "Wallet signature does not recover to the connected address");
            return Err(IdentityError::VerificationFailed);
        }

        let binding = SignedBinding {
            name,
            signature,
            address: address.clone(),
            timestamp,
        };
        self.save(&binding)?;

        info!(address = %address, "Display name bound");
        Ok(binding)
    }

    /// Persist a binding as-is, replacing any existing record.
    ///
    /// Does not verify; `load` will purge the record if it does not hold up.
    pub fn save(&self, binding: &SignedBinding) -> StorageResult<()> {
        BindingRepository::new(&*self.store).put(binding)
    }

    /// Load the binding for `address`, re-verifying its signature.
    ///
    /// Returns `Ok(None)` when there is no record or when the record was
    /// invalid; invalid records are deleted before returning.
    pub fn load(&self, address: &WalletAddress) -> StorageResult<Option<SignedBinding>> {
        let repo = BindingRepository::new(&*self.store);

        let binding = match repo.get(address) {
            Ok(Some(binding)) => binding,
            Ok(None) => return Ok(None),
            Err(StorageError::Json(e)) => {
                warn!(address = %address, error = %e, "Purging undecodable name binding");
                repo.delete(address)?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if !binding.address.same_as(address) {
            warn!(
                address = %address,
                claimed = %binding.address,
                "Purging name binding stored under another address"
            );
            repo.delete(address)?;
            return Ok(None);
        }

        let message = Self::build_message(&binding.name, &binding.address, binding.timestamp);
        if !verify(&message, &binding.signature, &binding.address) {
            warn!(address = %address, "Purging name binding with invalid signature");
            repo.delete(address)?;
            return Ok(None);
        }

        debug!(address = %address, "Name binding verified");
        Ok(Some(binding))
    }

    /// Verified display name for `address`, if any.
    pub fn display_name(&self, address: &WalletAddress) -> StorageResult<Option<String>> {
        Ok(self.load(address)?.map(|binding| binding.name))
    }

    /// Delete the binding for `address`. Missing records are not an error.
    pub fn remove(&self, address: &WalletAddress) -> StorageResult<()> {
        BindingRepository::new(&*self.store).delete(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SigningError;
    use crate::storage::{keys, InMemoryStore};
    use crate::testing::{ScriptedSigner, TEST_ADDRESS};

    const T0: i64 = 1_700_000_000_000;

    fn setup() -> (Arc<InMemoryStore>, IdentityBinder<InMemoryStore>, ScriptedSigner) {
        let store = Arc::new(InMemoryStore::new());
        let binder = IdentityBinder::new(Arc::clone(&store));
        (store, binder, ScriptedSigner::new())
    }

    #[test]
    fn normalize_trims_and_composes() {
        assert_eq!(normalize_name("  Alice  ", 64).unwrap(), "Alice");
        // "e" + combining acute accent composes to a single code point.
        assert_eq!(normalize_name("Jose\u{301}", 64).unwrap(), "Jos\u{e9}");
        assert!(matches!(normalize_name("   ", 64), Err(IdentityError::EmptyName)));
        assert!(matches!(
            normalize_name("abcdef", 5),
            Err(IdentityError::NameTooLong { max: 5 })
        ));
    }

    #[tokio::test]
    async fn bind_then_load_round_trips() {
        let (_store, binder, signer) = setup();
        let address = signer.address();

        let bound = binder.bind("Alice", &address, T0, Some(&signer)).await.unwrap();
        assert_eq!(bound.name, "Alice");
        assert_eq!(bound.address.as_str(), TEST_ADDRESS);

        let loaded = binder.load(&address).unwrap().unwrap();
        assert_eq!(loaded, bound);
        assert_eq!(loaded.timestamp, 1_700_000_000_000);
        assert_eq!(signer.requests(), vec![IdentityBinder::<InMemoryStore>::build_message(
            "Alice", &address, T0
        )]);
    }

    #[tokio::test]
    async fn load_is_case_insensitive() {
        let (_store, binder, signer) = setup();
        let address = signer.address();
        binder.bind("Alice", &address, T0, Some(&signer)).await.unwrap();

        let lower = WalletAddress::parse(&address.key()).unwrap();
        let loaded = binder.load(&lower).unwrap().unwrap();
        assert_eq!(loaded.name, "Alice");
        // The stored address keeps the casing that was signed.
        assert_eq!(loaded.address.as_str(), TEST_ADDRESS);
    }

    #[tokio::test]
    async fn tampered_name_is_purged() {
        let (store, binder, signer) = setup();
        let address = signer.address();
        let mut binding = binder.bind("Alice", &address, T0, Some(&signer)).await.unwrap();

        binding.name = "Mallory".to_string();
        binder.save(&binding).unwrap();

        assert!(binder.load(&address).unwrap().is_none());
        assert!(store.get(&keys::signed_name(&address)).unwrap().is_none());
    }

    #[tokio::test]
    async fn tampered_timestamp_is_purged() {
        let (store, binder, signer) = setup();
        let address = signer.address();
        let mut binding = binder.bind("Alice", &address, T0, Some(&signer)).await.unwrap();

        binding.timestamp += 1;
        binder.save(&binding).unwrap();

        assert!(binder.load(&address).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn foreign_signature_is_purged() {
        let (store, binder, signer) = setup();
        let address = signer.address();
        let other = ScriptedSigner::other_key();
        let message = IdentityBinder::<InMemoryStore>::build_message("Alice", &address, T0);
        let signature = other.sign_personal_message(&message).await.unwrap();

        binder
            .save(&SignedBinding {
                name: "Alice".to_string(),
                signature,
                address: address.clone(),
                timestamp: T0,
            })
            .unwrap();

        assert!(binder.load(&address).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn corrupt_record_is_purged() {
        let (store, binder, signer) = setup();
        let address = signer.address();
        store.set(&keys::signed_name(&address), "{not json").unwrap();

        assert!(binder.load(&address).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn record_under_wrong_key_is_purged() {
        let (store, binder, signer) = setup();
        let address = signer.address();
        let binding = binder.bind("Alice", &address, T0, Some(&signer)).await.unwrap();

        let elsewhere = WalletAddress::parse("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
        let json = serde_json::to_string(&binding).unwrap();
        store.set(&keys::signed_name(&elsewhere), &json).unwrap();

        assert!(binder.load(&elsewhere).unwrap().is_none());
        assert!(binder.load(&address).unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_name_fails_before_prompt() {
        let (store, binder, signer) = setup();
        let result = binder.bind("  ", &signer.address(), T0, Some(&signer)).await;

        assert!(matches!(result, Err(IdentityError::EmptyName)));
        assert!(signer.requests().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn rejected_prompt_writes_nothing() {
        let (store, binder, _) = setup();
        let signer = ScriptedSigner::rejecting();
        let result = binder.bind("Alice", &signer.address(), T0, Some(&signer)).await;

        assert!(result.as_ref().is_err_and(|e| e.is_rejection()));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_wallet_is_unavailable() {
        let (_store, binder, signer) = setup();
        let result = binder
            .bind::<ScriptedSigner>("Alice", &signer.address(), T0, None)
            .await;

        assert!(matches!(
            result,
            Err(IdentityError::Signing(SigningError::Unavailable))
        ));
    }

    #[tokio::test]
    async fn wrong_key_signature_is_not_saved() {
        let (store, binder, signer) = setup();
        let impostor = ScriptedSigner::impersonating(signer.address());
        let result = binder
            .bind("Alice", &signer.address(), T0, Some(&impostor))
            .await;

        assert!(matches!(result, Err(IdentityError::VerificationFailed)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn remove_deletes_binding() {
        let (_store, binder, signer) = setup();
        let address = signer.address();
        binder.bind("Alice", &address, T0, Some(&signer)).await.unwrap();

        binder.remove(&address).unwrap();
        assert!(binder.display_name(&address).unwrap().is_none());
        binder.remove(&address).unwrap();
    }
}
