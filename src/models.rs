// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Shared Data Models
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps Ethereum-style addresses (0x-prefixed,
//! 40 hex characters). The literal string is kept verbatim, checksum casing
//! included, so it can be replayed into signed messages; lookups go through
//! [`WalletAddress::key`], which is lowercased.

use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Ethereum-compatible wallet address wrapper.
///
/// Two addresses that differ only in casing are equal for storage purposes
/// (same [`key`](Self::key)) but keep their own display form.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::parse("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12")?;
/// assert_eq!(addr.key(), "0x742d35cc6634c0532925a3b844bc9e7595f4ab12");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

/// Rejected address input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid wallet address `{0}`: expected 0x followed by 40 hex characters")]
pub struct InvalidAddress(pub String);

impl WalletAddress {
    /// Validate and wrap an address string, preserving its casing.
    pub fn parse(raw: &str) -> Result<Self, InvalidAddress> {
        let trimmed = raw.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| InvalidAddress(raw.to_string()))?;

        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidAddress(raw.to_string()));
        }

        Ok(Self(format!("0x{hex}")))
    }

    /// Lowercased form used for storage keys and comparisons.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// The address as originally supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 20-byte address.
    pub fn to_address(&self) -> Address {
        // `parse` already validated the hex body, so this cannot fail.
        Address::from_str(&self.0).unwrap_or(Address::ZERO)
    }

    /// Case-insensitive equality.
    pub fn same_as(&self, other: &WalletAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = InvalidAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = InvalidAddress;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for WalletAddress {
    fn from(value: Address) -> Self {
        // Display for `Address` is the EIP-55 checksummed form.
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}
