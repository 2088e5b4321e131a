// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Purchase state machine.
//!
//! [`PurchaseMachine::run`] takes `&mut self`, so one attempt has exactly one
//! driver; observers follow along through [`PurchaseMachine::subscribe`].

use std::future::Future;

use alloy::primitives::{Address, U256};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{PurchasePhase, PurchaseState};
use crate::blockchain::{format_amount, parse_amount, ChainError, PurchaseGateway, TokenLedger};
use crate::error::PurchaseError;
use crate::models::WalletAddress;

/// Why an attempt stopped before `completed`.
enum Interrupt {
    Failed(PurchaseError),
    Abandoned,
}

impl From<PurchaseError> for Interrupt {
    fn from(err: PurchaseError) -> Self {
        Interrupt::Failed(err)
    }
}

/// Await `fut` unless `cancel` fires first.
async fn unless_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, Interrupt> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupt::Abandoned),
        out = fut => Ok(out),
    }
}

/// Map a chain failure to the phase it happened in.
fn chain_failure(phase: PurchasePhase, err: ChainError) -> PurchaseError {
    match err {
        ChainError::Rejected(_) => PurchaseError::TransactionRejected { phase },
        ChainError::Reverted { tx_hash } => PurchaseError::TransactionReverted { phase, tx_hash },
        other => PurchaseError::Chain {
            phase,
            message: other.to_string(),
        },
    }
}

/// Drives one approve-then-purchase attempt for `buyer`.
pub struct PurchaseMachine<'a, T, G> {
    ledger: &'a T,
    gateway: &'a G,
    buyer: Address,
    state: PurchaseState,
    /// Phases entered by the current attempt, in order.
    history: Vec<PurchasePhase>,
    updates: watch::Sender<PurchaseState>,
}

impl<'a, T: TokenLedger, G: PurchaseGateway> PurchaseMachine<'a, T, G> {
    /// Create an idle machine for buying at `price` (decimal token amount).
    pub fn new(
        ledger: &'a T,
        gateway: &'a G,
        buyer: &WalletAddress,
        price: impl Into<String>,
    ) -> Self {
        let state = PurchaseState::idle(price);
        let (updates, _) = watch::channel(state.clone());
        Self {
            ledger,
            gateway,
            buyer: buyer.to_address(),
            state,
            history: vec![PurchasePhase::Idle],
            updates,
        }
    }

    /// Label shown alongside the attempt, typically the buyer's display name.
    pub fn with_buyer_label(mut self, label: Option<String>) -> Self {
        self.state.buyer_label = label;
        self.publish();
        self
    }

    pub fn state(&self) -> &PurchaseState {
        &self.state
    }

    /// Every phase the current attempt has entered, starting with `idle`.
    ///
    /// Subscribers only see the latest state; this keeps the full order.
    pub fn history(&self) -> &[PurchasePhase] {
        &self.history
    }

    /// Receiver that sees every state change, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<PurchaseState> {
        self.updates.subscribe()
    }

    /// Start a fresh attempt. Allowed from `idle`, `completed` and `error`.
    pub fn reset(&mut self) -> Result<(), PurchaseError> {
        let price = self.state.price.clone();
        self.reset_with_price(price)
    }

    /// Start a fresh attempt at a new price.
    pub fn reset_with_price(&mut self, price: impl Into<String>) -> Result<(), PurchaseError> {
        if self.state.phase.is_in_flight() {
            return Err(PurchaseError::InvalidTransition {
                from: self.state.phase,
                to: PurchasePhase::Idle,
            });
        }
        self.restart(price.into());
        Ok(())
    }

    /// Run the attempt to a terminal phase.
    ///
    /// Returns early with a fresh `idle` state if `cancel` fires while a chain
    /// call is outstanding. Calling `run` outside `idle` is a no-op.
    pub async fn run(&mut self, cancel: &CancellationToken) -> &PurchaseState {
        if self.state.phase != PurchasePhase::Idle {
            warn!(
                attempt_id = %self.state.attempt_id,
                phase = %self.state.phase,
                "Purchase already started; reset before running again"
            );
            return &self.state;
        }

        info!(
            attempt_id = %self.state.attempt_id,
            buyer = %self.buyer,
            price = %self.state.price,
            "Starting purchase"
        );

        match self.execute(cancel).await {
            Ok(()) => {}
            Err(Interrupt::Failed(err)) => self.fail(err),
            Err(Interrupt::Abandoned) => {
                info!(
                    attempt_id = %self.state.attempt_id,
                    phase = %self.state.phase,
                    "Purchase abandoned"
                );
                let price = self.state.price.clone();
                self.restart(price);
            }
        }

        &self.state
    }

    async fn execute(&mut self, cancel: &CancellationToken) -> Result<(), Interrupt> {
        let ledger = self.ledger;
        let gateway = self.gateway;
        let spender = gateway.spender();

        self.advance(PurchasePhase::Checking)?;

        let decimals = unless_cancelled(cancel, ledger.decimals())
            .await?
            .map_err(|e| chain_failure(PurchasePhase::Checking, e))?;

        let price = parse_amount(&self.state.price, decimals)
            .map_err(|e| PurchaseError::InvalidPrice(e.to_string()))?;
        if price.is_zero() {
            return Err(
                PurchaseError::InvalidPrice("price must be greater than zero".to_string()).into(),
            );
        }

        let balance = unless_cancelled(cancel, ledger.balance_of(self.buyer))
            .await?
            .map_err(|e| chain_failure(PurchasePhase::Checking, e))?;
        if balance < price {
            return Err(PurchaseError::InsufficientBalance {
                required: format_amount(price, decimals),
                available: format_amount(balance, decimals),
            }
            .into());
        }

        let allowance = unless_cancelled(cancel, ledger.allowance(self.buyer, spender))
            .await?
            .map_err(|e| chain_failure(PurchasePhase::Checking, e))?;

        if allowance < price {
            self.approve(cancel, spender, price, decimals).await?;
        } else {
            debug!(attempt_id = %self.state.attempt_id, "Existing allowance covers price");
        }

        self.advance(PurchasePhase::Purchasing)?;
        // A purchase handed to the wallet may still land after cancellation.
        let receipt = match unless_cancelled(cancel, gateway.purchase(price)).await {
            Ok(result) => result.map_err(|e| chain_failure(PurchasePhase::Purchasing, e))?,
            Err(Interrupt::Abandoned) => {
                return Err(PurchaseError::MaybePending {
                    phase: PurchasePhase::Purchasing,
                }
                .into())
            }
            Err(other) => return Err(other),
        };
        self.state.purchase_tx = Some(receipt.tx_hash);

        self.advance(PurchasePhase::Completed)?;
        info!(
            attempt_id = %self.state.attempt_id,
            tx_hash = ?self.state.purchase_tx,
            "Purchase completed"
        );
        Ok(())
    }

    /// Approve exactly `price` and confirm the allowance took effect.
    async fn approve(
        &mut self,
        cancel: &CancellationToken,
        spender: Address,
        price: U256,
        decimals: u8,
    ) -> Result<(), Interrupt> {
        let ledger = self.ledger;
        self.advance(PurchasePhase::Approving)?;

        let receipt = unless_cancelled(cancel, ledger.approve(spender, price))
            .await?
            .map_err(|e| chain_failure(PurchasePhase::Approving, e))?;
        self.state.approval_tx = Some(receipt.tx_hash);
        self.publish();

        let approved = unless_cancelled(cancel, ledger.allowance(self.buyer, spender))
            .await?
            .map_err(|e| chain_failure(PurchasePhase::Approving, e))?;
        if approved < price {
            return Err(PurchaseError::InsufficientAllowance {
                required: format_amount(price, decimals),
                approved: format_amount(approved, decimals),
            }
            .into());
        }
        Ok(())
    }

    fn advance(&mut self, next: PurchasePhase) -> Result<(), PurchaseError> {
        let from = self.state.phase;
        if !from.can_transition_to(next) {
            return Err(PurchaseError::InvalidTransition { from, to: next });
        }
        debug!(attempt_id = %self.state.attempt_id, from = %from, to = %next, "Purchase transition");
        self.state.phase = next;
        self.history.push(next);
        self.publish();
        Ok(())
    }

    fn fail(&mut self, err: PurchaseError) {
        warn!(
            attempt_id = %self.state.attempt_id,
            phase = %self.state.phase,
            error = %err,
            "Purchase failed"
        );
        self.state.phase = PurchasePhase::Error;
        self.state.error_message = Some(err.to_string());
        self.history.push(PurchasePhase::Error);
        self.publish();
    }

    fn restart(&mut self, price: String) {
        let label = self.state.buyer_label.take();
        self.state = PurchaseState::idle(price);
        self.state.buyer_label = label;
        self.history = vec![PurchasePhase::Idle];
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}
