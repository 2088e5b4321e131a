// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::{classify_send_error, parse_address, receipt_outcome, ChainError};
use super::types::TxReceipt;

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Token surface the purchase flow depends on. All amounts are base units.
#[allow(async_fn_in_trait)]
pub trait TokenLedger {
    /// Token decimals, used to scale decimal prices.
    async fn decimals(&self) -> Result<u8, ChainError>;

    /// Balance held by `owner`.
    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError>;

    /// Amount `owner` has authorised `spender` to move.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError>;

    /// Submit `approve(spender, amount)` and wait for it to be mined.
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxReceipt, ChainError>;
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
    address: Address,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Create a new ERC-20 contract instance.
    pub fn new(provider: &P, contract_address: &str) -> Result<Self, ChainError> {
        let address = parse_address(contract_address)?;
        let contract = IERC20::new(address, provider.clone());
        Ok(Self { contract, address })
    }

    /// Token contract address.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl<P: Provider + Clone> TokenLedger for Erc20Contract<P> {
    async fn decimals(&self) -> Result<u8, ChainError> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ChainError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ChainError> {
        self.contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ChainError::ContractError(e.to_string()))
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxReceipt, ChainError> {
        let pending = self
            .contract
            .approve(spender, amount)
            .send()
            .await
            .map_err(classify_send_error)?;

        tracing::info!(
            token = %self.address,
            spender = %spender,
            tx_hash = ?pending.tx_hash(),
            "Approval submitted"
        );

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ChainError::RpcError(format!("Failed to get receipt: {}", e)))?;

        receipt_outcome(receipt)
    }
}
