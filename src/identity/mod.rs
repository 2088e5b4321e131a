// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Identity
//!
//! Display names bound to wallet addresses by personal-message signatures,
//! with no server account involved.
//!
//! - `message` - canonical, byte-stable texts that get signed
//! - `signature` - requesting signatures and recovering their signer
//! - `binder` - persisting bindings; every read re-verifies and purges
//!   records that no longer verify
//! - `login` - attestation state machine driven by wallet connection events
//! - `name_edit` - the interactive rename flow
//!
//! Login attestation and name edits write under the same address and must
//! not race, so both take the session's [`SigningGate`] while a signature
//! prompt is open.

use std::sync::Arc;

use chrono::Utc;

pub mod binder;
pub mod login;
pub mod message;
pub mod name_edit;
pub mod signature;

pub use binder::{normalize_name, IdentityBinder, DEFAULT_MAX_NAME_LENGTH};
pub use login::{LoginAttestor, LoginStatus};
pub use name_edit::{CancelOutcome, EditorState, NameEditor};

/// Serializes signature prompts within one session.
pub type SigningGate = Arc<tokio::sync::Mutex<()>>;

/// Create an unlocked signing gate.
pub fn signing_gate() -> SigningGate {
    Arc::new(tokio::sync::Mutex::new(()))
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
