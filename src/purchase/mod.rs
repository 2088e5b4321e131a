// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Purchase Flow
//!
//! Approve-then-purchase against an ERC-20 token and a checkout contract:
//!
//! ```text
//! idle -> checking -> [approving ->] purchasing -> completed
//!            \             \             \
//!             +-------------+-------------+--> error
//! ```
//!
//! `approving` is skipped when the existing allowance already covers the
//! price. `completed` and `error` are terminal; a new attempt starts from a
//! fresh `idle` state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod machine;

pub use machine::PurchaseMachine;

/// Step of a purchase attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchasePhase {
    Idle,
    Checking,
    Approving,
    Purchasing,
    Completed,
    Error,
}

impl PurchasePhase {
    /// Whether the forward transition `self -> next` is allowed.
    pub fn can_transition_to(self, next: PurchasePhase) -> bool {
        use PurchasePhase::*;
        matches!(
            (self, next),
            (Idle, Checking)
                | (Checking, Approving)
                | (Checking, Purchasing)
                | (Approving, Purchasing)
                | (Purchasing, Completed)
                | (Checking | Approving | Purchasing, Error)
        )
    }

    /// `completed` and `error` end an attempt.
    pub fn is_terminal(self) -> bool {
        matches!(self, PurchasePhase::Completed | PurchasePhase::Error)
    }

    /// A chain read or transaction may be outstanding.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            PurchasePhase::Checking | PurchasePhase::Approving | PurchasePhase::Purchasing
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PurchasePhase::Idle => "idle",
            PurchasePhase::Checking => "checking",
            PurchasePhase::Approving => "approving",
            PurchasePhase::Purchasing => "purchasing",
            PurchasePhase::Completed => "completed",
            PurchasePhase::Error => "error",
        }
    }
}

impl std::fmt::Display for PurchasePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of one purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseState {
    /// Unique per attempt; a reset starts a new one
    pub attempt_id: Uuid,
    pub phase: PurchasePhase,
    /// Decimal token amount, e.g. "10.5"
    pub price: String,
    /// Set only in the `error` phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Display name of the connected buyer, when bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_tx: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_tx: Option<String>,
}

impl PurchaseState {
    /// Fresh `idle` state for a new attempt.
    pub fn idle(price: impl Into<String>) -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            phase: PurchasePhase::Idle,
            price: price.into(),
            error_message: None,
            buyer_label: None,
            approval_tx: None,
            purchase_tx: None,
        }
    }
}
