// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storage key helpers. Every key embeds the lowercased address so that
//! differently-cased spellings of one wallet share a single record.

use crate::models::WalletAddress;

/// Prefix for login attestation records.
pub const LOGIN_PREFIX: &str = "login_";

/// Prefix for signed display-name bindings.
pub const SIGNED_NAME_PREFIX: &str = "signedName_";

/// Key of the login attestation for `address`.
pub fn login(address: &WalletAddress) -> String {
    format!("{LOGIN_PREFIX}{}", address.key())
}

/// Key of the signed name binding for `address`.
pub fn signed_name(address: &WalletAddress) -> String {
    format!("{SIGNED_NAME_PREFIX}{}", address.key())
}
