// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical messages presented in the wallet's signing prompt.
//!
//! Both templates are plain ASCII apart from the user's name and use no
//! locale-dependent formatting, so the same inputs always produce the same
//! bytes.

use crate::models::WalletAddress;

/// Fixed prefix of the login attestation message. The wording predates the
/// separate name template and is kept so existing attestations stay valid.
pub const LOGIN_MESSAGE_PREFIX: &str = "I am requesting to change my name. User address: ";

/// Header line of the name-binding message.
pub const NAME_MESSAGE_HEADER: &str = "Set display name";

/// Message signed once per address on first connection.
pub fn login_message(address: &WalletAddress) -> String {
    format!("{LOGIN_MESSAGE_PREFIX}{address}")
}

/// Message binding `name` to `address` at `timestamp` (milliseconds).
pub fn name_message(name: &str, address: &WalletAddress, timestamp: i64) -> String {
    format!("{NAME_MESSAGE_HEADER}\nName: {name}\nAddress: {address}\nTimestamp: {timestamp}")
}
