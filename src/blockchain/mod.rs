// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for EVM chains.
//!
//! This module provides functionality for:
//! - Personal-message signing with a connected wallet
//! - ERC-20 balance, allowance, approve and decimals
//! - Submitting the purchase transaction to the checkout contract
//! - Converting between decimal amounts and token base units

pub mod amount;
pub mod checkout;
pub mod client;
pub mod erc20;
pub mod signing;
pub mod types;

pub use amount::{format_amount, parse_amount, AmountError};
pub use checkout::{PurchaseContract, PurchaseGateway};
pub use client::{ChainClient, ChainError};
pub use erc20::{Erc20Contract, TokenLedger};
pub use signing::{LocalWalletSigner, MessageSigner};
pub use types::*;
