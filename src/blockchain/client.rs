// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM client that binds a signing wallet to an HTTP provider.

use std::str::FromStr;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::Address,
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionReceipt,
};

use super::checkout::PurchaseContract;
use super::erc20::Erc20Contract;
use super::types::{NetworkConfig, TxReceipt};

/// HTTP provider with all fillers plus the connected wallet.
pub type WalletProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// JSON-RPC error code wallets use when the user declines a request (EIP-1193).
const USER_REJECTED_CODE: i64 = 4001;

/// Chain client for a single network and wallet.
pub struct ChainClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider with wallet filler
    provider: WalletProvider,
}

impl ChainClient {
    /// Connect to `rpc_url` with transactions signed by `wallet`.
    pub fn connect(
        network: NetworkConfig,
        rpc_url: &str,
        wallet: EthereumWallet,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self { network, provider })
    }

    /// ERC-20 contract bound to this client's wallet.
    pub fn token(&self, token_address: &str) -> Result<Erc20Contract<WalletProvider>, ChainError> {
        Erc20Contract::new(&self.provider, token_address)
    }

    /// Checkout contract bound to this client's wallet.
    pub fn checkout(
        &self,
        contract_address: &str,
    ) -> Result<PurchaseContract<WalletProvider>, ChainError> {
        PurchaseContract::new(&self.provider, contract_address)
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

/// Parse a 0x-prefixed contract or wallet address.
pub(crate) fn parse_address(raw: &str) -> Result<Address, ChainError> {
    Address::from_str(raw.trim()).map_err(|e| ChainError::InvalidAddress(e.to_string()))
}

/// Map a contract send failure, separating wallet declines from other errors.
pub(crate) fn classify_send_error(err: alloy::contract::Error) -> ChainError {
    if let alloy::contract::Error::TransportError(rpc_err) = &err {
        if let Some(payload) = rpc_err.as_error_resp() {
            if payload.code == USER_REJECTED_CODE {
                return ChainError::Rejected(payload.message.to_string());
            }
        }
    }
    ChainError::ContractError(err.to_string())
}

/// Turn a mined receipt into a success or a revert.
pub(crate) fn receipt_outcome(receipt: TransactionReceipt) -> Result<TxReceipt, ChainError> {
    let tx_hash = format!("{:?}", receipt.transaction_hash);
    if !receipt.status() {
        return Err(ChainError::Reverted { tx_hash });
    }
    Ok(TxReceipt {
        tx_hash,
        block_number: receipt.block_number.unwrap_or(0),
    })
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    /// The user declined the transaction prompt.
    #[error("Transaction rejected in wallet: {0}")]
    Rejected(String),

    /// Mined with a failed status.
    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },
}
