// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Requesting personal-message signatures and recovering their signer.

use alloy::primitives::{Address, Signature};

use crate::blockchain::MessageSigner;
use crate::error::SigningError;
use crate::models::WalletAddress;

/// Ask the connected wallet to sign `message`.
///
/// `None` means no wallet capability is present.
pub async fn request_signature<W: MessageSigner>(
    message: &str,
    signer: Option<&W>,
) -> Result<String, SigningError> {
    let signer = signer.ok_or(SigningError::Unavailable)?;
    tracing::debug!(address = %signer.address(), "Requesting personal-message signature");
    signer.sign_personal_message(message).await
}

/// Recover the address that signed `message` as a personal message.
///
/// Returns `None` for malformed hex or signatures that do not recover.
pub fn recover_address(message: &str, signature: &str) -> Option<Address> {
    let bytes = alloy::hex::decode(signature.trim()).ok()?;
    let signature = Signature::from_raw(&bytes).ok()?;
    signature.recover_address_from_msg(message.as_bytes()).ok()
}

/// True if `signature` over `message` recovers to `claimed` (any casing).
pub fn verify(message: &str, signature: &str, claimed: &WalletAddress) -> bool {
    recover_address(message, signature).is_some_and(|recovered| recovered == claimed.to_address())
}
