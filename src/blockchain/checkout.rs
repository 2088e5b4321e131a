// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Checkout contract: the spender that pulls the approved tokens on purchase.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::{classify_send_error, parse_address, receipt_outcome, ChainError};
use super::types::TxReceipt;

sol! {
    #[sol(rpc)]
    interface ICheckout {
        function purchase(uint256 amount) external;
    }
}

/// Destination contract of the approve-then-purchase flow.
#[allow(async_fn_in_trait)]
pub trait PurchaseGateway {
    /// Address that must hold the allowance.
    fn spender(&self) -> Address;

    /// Submit the purchase spending up to `amount` base units and wait for it
    /// to be mined.
    async fn purchase(&self, amount: U256) -> Result<TxReceipt, ChainError>;
}

/// Checkout contract wrapper.
pub struct PurchaseContract<P> {
    contract: ICheckout::ICheckoutInstance<P>,
    address: Address,
}

impl<P: Provider + Clone> PurchaseContract<P> {
    /// Create a new checkout contract instance.
    pub fn new(provider: &P, contract_address: &str) -> Result<Self, ChainError> {
        let address = parse_address(contract_address)?;
        let contract = ICheckout::new(address, provider.clone());
        Ok(Self { contract, address })
    }
}

impl<P: Provider + Clone> PurchaseGateway for PurchaseContract<P> {
    fn spender(&self) -> Address {
        self.address
    }

    async fn purchase(&self, amount: U256) -> Result<TxReceipt, ChainError> {
        let pending = self
            .contract
            .purchase(amount)
            .send()
            .await
            .map_err(classify_send_error)?;

        tracing::info!(
            contract = %self.address,
            tx_hash = ?pending.tx_hash(),
            "Purchase submitted"
        );

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::RpcError(format!("Failed to get receipt: {}", e)))?;

        receipt_outcome(receipt)
    }
}
