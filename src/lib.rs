// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Identity & Checkout
//!
//! Display names bound to wallet addresses by personal-message signatures,
//! login attestation on wallet connection, and an approve-then-purchase
//! ERC-20 payment flow with observable progress.
//!
//! ## Modules
//!
//! - `identity` - Name binding, login attestation, name editing
//! - `purchase` - Approve-then-purchase state machine
//! - `blockchain` - Wallet signing, ERC-20 and checkout contracts (alloy)
//! - `storage` - Key-value persistence (in-memory and redb)
//! - `session` - Per-wallet composition of the identity flows
//! - `config` - Environment configuration

pub mod blockchain;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod purchase;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;
