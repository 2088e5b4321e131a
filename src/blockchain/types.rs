// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// Default payment token on this network
    pub default_token: Erc20Token,
}

/// Known ERC-20 token metadata.
#[derive(Debug, Clone)]
pub struct Erc20Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    pub address: &'static str,
}

/// USDC on Avalanche C-Chain mainnet.
pub const USDC_MAINNET: Erc20Token = Erc20Token {
    symbol: "USDC",
    name: "USD Coin",
    decimals: 6,
    address: "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E",
};

/// Circle's test USDC on Avalanche Fuji.
pub const USDC_FUJI: Erc20Token = Erc20Token {
    symbol: "USDC",
    name: "USD Coin",
    decimals: 6,
    address: "0x5425890298aed601595a70AB815c96711a31Bc65",
};

/// Avalanche C-Chain Mainnet configuration.
pub const AVAX_MAINNET: NetworkConfig = NetworkConfig {
    name: "Avalanche C-Chain",
    chain_id: 43114,
    rpc_url: "https://api.avax.network/ext/bc/C/rpc",
    explorer_url: "https://snowtrace.io",
    default_token: USDC_MAINNET,
};

/// Avalanche Fuji Testnet configuration.
pub const AVAX_FUJI: NetworkConfig = NetworkConfig {
    name: "Avalanche Fuji Testnet",
    chain_id: 43113,
    rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
    explorer_url: "https://testnet.snowtrace.io",
    default_token: USDC_FUJI,
};

/// Resolve a network preset by its short name (`fuji` or `mainnet`).
pub fn network_by_name(raw: &str) -> Result<NetworkConfig, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "fuji" => Ok(AVAX_FUJI),
        "mainnet" => Ok(AVAX_MAINNET),
        other => Err(format!(
            "Unknown network `{other}` (expected `fuji` or `mainnet`)"
        )),
    }
}

impl NetworkConfig {
    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// Confirmed, successful transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where transaction was included
    pub block_number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_by_name_accepts_presets() {
        assert_eq!(network_by_name("fuji").unwrap().chain_id, 43113);
        assert_eq!(network_by_name(" Mainnet ").unwrap().chain_id, 43114);
        assert!(network_by_name("sepolia").is_err());
    }

    #[test]
    fn tx_url_uses_explorer() {
        assert_eq!(
            AVAX_FUJI.tx_url("0xabc"),
            "https://testnet.snowtrace.io/tx/0xabc"
        );
    }
}
