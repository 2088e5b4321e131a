// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test doubles for the wallet and chain capabilities.

use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use tokio::sync::Notify;

use crate::blockchain::{
    parse_amount, ChainError, LocalWalletSigner, MessageSigner, PurchaseGateway, TokenLedger,
    TxReceipt,
};
use crate::error::SigningError;
use crate::models::WalletAddress;

/// Hardhat account #0.
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Hardhat account #1.
pub const OTHER_PRIVATE_KEY: &str =
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const OTHER_ADDRESS: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub const SPENDER_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

#[derive(Clone)]
enum SignMode {
    Sign,
    Reject,
    Hold(Arc<Notify>),
}

/// Wallet double that signs with a real key, declines, or waits for release.
pub struct ScriptedSigner {
    inner: LocalWalletSigner,
    address: WalletAddress,
    mode: Mutex<SignMode>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSigner {
    fn with(private_key: &str, address: Option<WalletAddress>, mode: SignMode) -> Self {
        let inner = LocalWalletSigner::from_hex(private_key).unwrap();
        let address = address.unwrap_or_else(|| inner.address());
        Self {
            inner,
            address,
            mode: Mutex::new(mode),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Signs everything with the test key.
    pub fn new() -> Self {
        Self::with(TEST_PRIVATE_KEY, None, SignMode::Sign)
    }

    /// Signs everything with the second test key.
    pub fn other_key() -> Self {
        Self::with(OTHER_PRIVATE_KEY, None, SignMode::Sign)
    }

    /// Test-key wallet whose user declines every prompt.
    pub fn rejecting() -> Self {
        Self::with(TEST_PRIVATE_KEY, None, SignMode::Reject)
    }

    /// Reports `address` but signs with a different key.
    pub fn impersonating(address: WalletAddress) -> Self {
        Self::with(OTHER_PRIVATE_KEY, Some(address), SignMode::Sign)
    }

    /// Keeps each prompt open until `release` is notified, then signs.
    pub fn holding(release: Arc<Notify>) -> Self {
        Self::with(TEST_PRIVATE_KEY, None, SignMode::Hold(release))
    }

    pub fn set_rejecting(&self, rejecting: bool) {
        let mode = if rejecting {
            SignMode::Reject
        } else {
            SignMode::Sign
        };
        *self.mode.lock().unwrap() = mode;
    }

    /// Messages presented to this wallet, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl MessageSigner for ScriptedSigner {
    fn address(&self) -> WalletAddress {
        self.address.clone()
    }

    async fn sign_personal_message(&self, message: &str) -> Result<String, SigningError> {
        self.requests.lock().unwrap().push(message.to_string());
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            SignMode::Sign => self.inner.sign_personal_message(message).await,
            SignMode::Reject => Err(SigningError::Rejected),
            SignMode::Hold(release) => {
                release.notified().await;
                self.inner.sign_personal_message(message).await
            }
        }
    }
}

/// Scripted result of a fake transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Mined,
    /// Mined successfully but the allowance does not change.
    MinedWithoutEffect,
    Rejected,
    Reverted,
    /// Never resolves.
    Hang,
}

fn scripted(outcome: TxOutcome, tx_hash: &str) -> Result<TxReceipt, ChainError> {
    match outcome {
        TxOutcome::Mined | TxOutcome::MinedWithoutEffect => Ok(TxReceipt {
            tx_hash: tx_hash.to_string(),
            block_number: 1,
        }),
        TxOutcome::Rejected => Err(ChainError::Rejected(
            "User denied transaction signature".to_string(),
        )),
        TxOutcome::Reverted => Err(ChainError::Reverted {
            tx_hash: tx_hash.to_string(),
        }),
        TxOutcome::Hang => unreachable!("hanging outcomes never resolve"),
    }
}

pub const APPROVAL_TX: &str = "0x00000000000000000000000000000000000000000000000000000000000000a1";
pub const PURCHASE_TX: &str = "0x00000000000000000000000000000000000000000000000000000000000000b1";

/// In-memory ERC-20 with one holder and one spender.
pub struct FakeLedger {
    decimals: u8,
    balance: U256,
    allowance: Mutex<U256>,
    approve_outcome: TxOutcome,
    rpc_failure: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeLedger {
    /// `balance` and `allowance` are decimal token amounts.
    pub fn new(decimals: u8, balance: &str, allowance: &str) -> Self {
        Self {
            decimals,
            balance: parse_amount(balance, decimals).unwrap(),
            allowance: Mutex::new(parse_amount(allowance, decimals).unwrap()),
            approve_outcome: TxOutcome::Mined,
            rpc_failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Report `decimals` from the contract without rescaling balances.
    pub fn reporting_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_approve(mut self, outcome: TxOutcome) -> Self {
        self.approve_outcome = outcome;
        self
    }

    /// Make every read fail with an RPC error.
    pub fn failing_reads(mut self, message: &str) -> Self {
        self.rpc_failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of approve transactions submitted.
    pub fn approvals(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("approve"))
            .count()
    }

    pub fn current_allowance(&self) -> U256 {
        *self.allowance.lock().unwrap()
    }

    /// Log the call and yield, so watchers observe each step.
    async fn record(&self, call: String) -> Result<(), ChainError> {
        self.calls.lock().unwrap().push(call);
        tokio::task::yield_now().await;
        match &self.rpc_failure {
            Some(message) => Err(ChainError::RpcError(message.clone())),
            None => Ok(()),
        }
    }
}

impl TokenLedger for FakeLedger {
    async fn decimals(&self) -> Result<u8, ChainError> {
        self.record("decimals".to_string()).await?;
        Ok(self.decimals)
    }

    async fn balance_of(&self, _owner: Address) -> Result<U256, ChainError> {
        self.record("balance_of".to_string()).await?;
        Ok(self.balance)
    }

    async fn allowance(&self, _owner: Address, _spender: Address) -> Result<U256, ChainError> {
        self.record("allowance".to_string()).await?;
        Ok(self.current_allowance())
    }

    async fn approve(&self, _spender: Address, amount: U256) -> Result<TxReceipt, ChainError> {
        self.calls.lock().unwrap().push(format!("approve {amount}"));
        tokio::task::yield_now().await;
        if self.approve_outcome == TxOutcome::Hang {
            return std::future::pending().await;
        }
        if self.approve_outcome == TxOutcome::Mined {
            *self.allowance.lock().unwrap() = amount;
        }
        scripted(self.approve_outcome, APPROVAL_TX)
    }
}

/// Checkout contract double recording each purchase amount.
pub struct FakeGateway {
    spender: Address,
    outcome: TxOutcome,
    purchases: Mutex<Vec<U256>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            spender: SPENDER_ADDRESS.parse().unwrap(),
            outcome: TxOutcome::Mined,
            purchases: Mutex::new(Vec::new()),
        }
    }

    pub fn with_outcome(mut self, outcome: TxOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn purchases(&self) -> Vec<U256> {
        self.purchases.lock().unwrap().clone()
    }
}

impl PurchaseGateway for FakeGateway {
    fn spender(&self) -> Address {
        self.spender
    }

    async fn purchase(&self, amount: U256) -> Result<TxReceipt, ChainError> {
        self.purchases.lock().unwrap().push(amount);
        tokio::task::yield_now().await;
        if self.outcome == TxOutcome::Hang {
            return std::future::pending().await;
        }
        scripted(self.outcome, PURCHASE_TX)
    }
}
