// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between human-readable decimal amounts and token base units.
//!
//! Prices arrive as decimal strings ("10.5") and are compared and submitted
//! as integer base units scaled by the token's `decimals`.

use std::str::FromStr;

use alloy::primitives::U256;

/// Rejected decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount format: `{0}`")]
    InvalidFormat(String),

    #[error("Too many decimal places (max {max})")]
    TooManyDecimals { max: u8 },

    #[error("Amount overflow")]
    Overflow,
}

/// Parse a human-readable amount to token base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for AVAX, 6 for USDC)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole_str, frac_str) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole_str.is_empty() && frac_str.is_empty())
        || !is_digits(whole_str)
        || !is_digits(frac_str)
    {
        return Err(AmountError::InvalidFormat(amount.to_string()));
    }

    if frac_str.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals { max: decimals });
    }

    let whole = if whole_str.is_empty() {
        U256::ZERO
    } else {
        U256::from_str(whole_str).map_err(|_| AmountError::Overflow)?
    };

    // Pad with zeros to match decimals
    let padded = format!("{:0<width$}", frac_str, width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str(&padded).map_err(|_| AmountError::Overflow)?
    };

    let multiplier = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or(AmountError::Overflow)?;
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(AmountError::Overflow)
}

/// Format token base units to a human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let width = decimals as usize;
    let Some(divisor) = U256::from(10u64).checked_pow(U256::from(decimals)) else {
        // 10^decimals exceeds U256, so every amount is a pure fraction.
        let digits = format!("{:0>width$}", amount.to_string());
        return format!("0.{}", digits.trim_end_matches('0'));
    };
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder.to_string());
        let trimmed = decimal_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}
