// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signing capability.
//!
//! [`MessageSigner`] is the only source of signatures in this crate: the
//! identity layer never fabricates or bypasses it. Signatures use the
//! personal-message scheme (EIP-191 `"\x19Ethereum Signed Message:\n" + len`
//! prefix) and are exchanged as 0x-prefixed 65-byte hex strings.
//!
//! [`LocalWalletSigner`] backs the capability with a private key loaded from
//! PEM (PKCS#8 or SEC1) or hex.

use alloy::{
    network::EthereumWallet,
    signers::{local::PrivateKeySigner, Signer},
};
use k256::SecretKey;

use super::client::ChainError;
use crate::error::SigningError;
use crate::models::WalletAddress;

/// Personal-message signing capability of a connected wallet.
#[allow(async_fn_in_trait)]
pub trait MessageSigner {
    /// Address whose key produces the signatures.
    fn address(&self) -> WalletAddress;

    /// Sign `message` as a personal message and return the hex signature.
    ///
    /// Returns [`SigningError::Rejected`] when the user declines the prompt.
    async fn sign_personal_message(&self, message: &str) -> Result<String, SigningError>;
}

/// Signer backed by a locally held secp256k1 key.
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    signer: PrivateKeySigner,
}

impl LocalWalletSigner {
    /// Create a signer from a private key (hex string, with or without 0x prefix).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ChainError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self { signer })
    }

    /// Create a signer from a PEM-encoded private key.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, ChainError> {
        let hex_key = pem_to_hex(pem_bytes)?;
        Self::from_hex(&hex_key)
    }

    /// Ethereum wallet for transaction signing with the same key.
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl MessageSigner for LocalWalletSigner {
    fn address(&self) -> WalletAddress {
        WalletAddress::from(self.signer.address())
    }

    async fn sign_personal_message(&self, message: &str) -> Result<String, SigningError> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| SigningError::Failed(e.to_string()))?;

        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }
}

/// Parse a private key from PEM format to hex string.
///
/// Accepts SEC1 (`EC PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) encodings.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(ChainError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, ChainError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}
