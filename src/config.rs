// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`Config`] loaded from them
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory for the identity database | `./data` |
//! | `NETWORK` | Network preset (`fuji` or `mainnet`) | `fuji` |
//! | `RPC_URL` | JSON-RPC endpoint override | Preset endpoint |
//! | `TOKEN_ADDRESS` | ERC-20 token used for payment | Preset USDC |
//! | `PURCHASE_CONTRACT` | Checkout contract (allowance spender) | None |
//! | `WALLET_KEY_PATH` | PEM private key for the local wallet | None (no wallet) |
//! | `DISPLAY_NAME` | Name to bind after connecting | None |
//! | `PURCHASE_PRICE` | Decimal token amount to pay | None |
//! | `MAX_NAME_LENGTH` | Longest accepted display name | `64` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;

use crate::blockchain::{network_by_name, NetworkConfig};
use crate::identity::DEFAULT_MAX_NAME_LENGTH;
use crate::models::WalletAddress;
use crate::storage::paths::DATA_ROOT;

/// Environment variable name for the data directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the network preset.
pub const NETWORK_ENV: &str = "NETWORK";

/// Default network preset.
pub const DEFAULT_NETWORK: &str = "fuji";

/// Environment variable name for the RPC endpoint override.
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Environment variable name for the payment token address.
pub const TOKEN_ADDRESS_ENV: &str = "TOKEN_ADDRESS";

/// Environment variable name for the checkout contract address.
pub const PURCHASE_CONTRACT_ENV: &str = "PURCHASE_CONTRACT";

/// Environment variable name for the wallet PEM key path.
///
/// Without it the session runs with no wallet capability and every signing
/// request fails as unavailable.
pub const WALLET_KEY_PATH_ENV: &str = "WALLET_KEY_PATH";

pub const DISPLAY_NAME_ENV: &str = "DISPLAY_NAME";

pub const PURCHASE_PRICE_ENV: &str = "PURCHASE_PRICE";

pub const MAX_NAME_LENGTH_ENV: &str = "MAX_NAME_LENGTH";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Configuration errors, reported before anything else starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    UnknownNetwork(String),

    #[error("Invalid {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        reason: reason.to_string(),
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub token_address: WalletAddress,
    pub purchase_contract: Option<WalletAddress>,
    pub wallet_key_path: Option<PathBuf>,
    pub display_name: Option<String>,
    pub purchase_price: Option<String>,
    pub max_name_length: usize,
    pub log_format: LogFormat,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let network = network_by_name(&get(NETWORK_ENV).unwrap_or_else(|| DEFAULT_NETWORK.into()))
            .map_err(ConfigError::UnknownNetwork)?;

        let rpc_url = get(RPC_URL_ENV).unwrap_or_else(|| network.rpc_url.to_string());
        let parsed = url::Url::parse(&rpc_url).map_err(|e| invalid(RPC_URL_ENV, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(RPC_URL_ENV, "expected an http or https URL"));
        }

        let token_address = WalletAddress::parse(
            &get(TOKEN_ADDRESS_ENV).unwrap_or_else(|| network.default_token.address.to_string()),
        )
        .map_err(|e| invalid(TOKEN_ADDRESS_ENV, e))?;

        let purchase_contract = get(PURCHASE_CONTRACT_ENV)
            .map(|raw| WalletAddress::parse(&raw))
            .transpose()
            .map_err(|e| invalid(PURCHASE_CONTRACT_ENV, e))?;

        let max_name_length = match get(MAX_NAME_LENGTH_ENV) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => return Err(invalid(MAX_NAME_LENGTH_ENV, "must be at least 1")),
                Ok(n) => n,
                Err(e) => return Err(invalid(MAX_NAME_LENGTH_ENV, e)),
            },
            None => DEFAULT_MAX_NAME_LENGTH,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(invalid(
                    LOG_FORMAT_ENV,
                    format!("`{other}` (expected `json` or `pretty`)"),
                ))
            }
        };

        Ok(Self {
            data_dir: get(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DATA_ROOT)),
            network,
            rpc_url,
            token_address,
            purchase_contract,
            wallet_key_path: get(WALLET_KEY_PATH_ENV).map(PathBuf::from),
            display_name: get(DISPLAY_NAME_ENV),
            purchase_price: get(PURCHASE_PRICE_ENV).map(|p| p.trim().to_string()),
            max_name_length,
            log_format,
        })
    }
}
