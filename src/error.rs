// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy for identity binding and purchases.
//!
//! Signing and transaction failures are ordinary outcomes: flows turn them
//! into renderable state. Signature verification failures never appear here
//! for reads; the identity layer purges the record and reports absence.

use crate::models::InvalidAddress;
use crate::purchase::PurchasePhase;
use crate::storage::StorageError;

/// Failure to obtain a signature from the wallet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// The user declined the prompt. Recoverable, never retried automatically.
    #[error("Signature request was declined in the wallet")]
    Rejected,

    /// No wallet is connected or injected.
    #[error("No wallet is connected")]
    Unavailable,

    #[error("Wallet failed to sign: {0}")]
    Failed(String),
}

/// Errors from binding a display name or attesting a login.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Display name cannot be empty")]
    EmptyName,

    #[error("Display name is longer than {max} characters")]
    NameTooLong { max: usize },

    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),

    /// The wallet produced a signature that does not recover to the address.
    #[error("Wallet returned a signature that does not match the connected address")]
    VerificationFailed,

    #[error(transparent)]
    Signing(#[from] SigningError),

    /// Another signature prompt for this session is still open.
    #[error("Another signature request is already pending")]
    SigningInProgress,

    /// Save was attempted while the name editor was not open.
    #[error("Name editor is not open")]
    EditorClosed,

    /// The owning context went away while the prompt was open.
    #[error("Signature request was abandoned")]
    Abandoned,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IdentityError {
    /// True when the user simply said no.
    pub fn is_rejection(&self) -> bool {
        matches!(self, IdentityError::Signing(SigningError::Rejected))
    }
}

/// Reasons a purchase attempt ends in the `error` phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Insufficient balance: {required} required, {available} available")]
    InsufficientBalance { required: String, available: String },

    #[error("Insufficient allowance: {required} required, {approved} approved")]
    InsufficientAllowance { required: String, approved: String },

    #[error("Transaction declined in the wallet while {phase}")]
    TransactionRejected { phase: PurchasePhase },

    #[error("Transaction {tx_hash} reverted while {phase}")]
    TransactionReverted { phase: PurchasePhase, tx_hash: String },

    #[error("Blockchain error while {phase}: {message}")]
    Chain { phase: PurchasePhase, message: String },

    /// Abandoned after the transaction was handed to the wallet.
    #[error("Stopped waiting while {phase}; the transaction may still be pending")]
    MaybePending { phase: PurchasePhase },

    #[error("Invalid purchase transition from {from} to {to}")]
    InvalidTransition { from: PurchasePhase, to: PurchasePhase },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = PurchaseError::InsufficientBalance {
            required: "10.5".to_string(),
            available: "5".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: 10.5 required, 5 available"
        );

        let err = PurchaseError::TransactionRejected {
            phase: PurchasePhase::Approving,
        };
        assert_eq!(
            err.to_string(),
            "Transaction declined in the wallet while approving"
        );
    }

    #[test]
    fn rejection_is_detected() {
        assert!(IdentityError::Signing(SigningError::Rejected).is_rejection());
        assert!(!IdentityError::Signing(SigningError::Unavailable).is_rejection());
        assert!(!IdentityError::EmptyName.is_rejection());
    }
}
