//! TFT amount helpers
//!
//! On chain, TFT balances are integers in the smallest unit. Stellar uses 7
//! decimals for every asset and the token contract mirrors that, so all
//! display values are the raw amount divided by 10^7.

use alloy::primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

use crate::error::AmountError;

/// Decimals of the TFT asset on both chains
pub const TFT_DECIMALS: u32 = 7;

/// Integer digits of `U256::MAX`
const MAX_INTEGER_DIGITS: i64 = 78;

/// Convert a raw on-chain amount into TFT
pub fn from_base_units(raw: U256) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &raw.to_be_bytes::<32>());
    BigDecimal::new(digits, TFT_DECIMALS as i64)
}

/// Reject amounts with more than [`TFT_DECIMALS`] fractional digits or more
/// integer digits than a raw amount can hold.
///
/// Only inspects digit counts and the exponent, so it stays cheap for inputs
/// like `1e-100000000` that make scaling arithmetic effectively unbounded.
pub fn check_magnitude(amount: &BigDecimal) -> Result<(), AmountError> {
    let normalized = amount.normalized();
    if normalized.is_zero() {
        return Ok(());
    }

    let fractional = normalized.fractional_digit_count();
    if fractional > TFT_DECIMALS as i64 {
        return Err(AmountError::ExcessPrecision {
            max_decimals: TFT_DECIMALS,
        });
    }
    if normalized.digits() as i64 - fractional > MAX_INTEGER_DIGITS {
        return Err(AmountError::Malformed("amount out of range".to_string()));
    }
    Ok(())
}

/// Convert a TFT amount into raw on-chain units
///
/// Rejects negative amounts and amounts with more than [`TFT_DECIMALS`]
/// fractional digits rather than rounding them away.
pub fn to_base_units(amount: &BigDecimal) -> Result<U256, AmountError> {
    if amount.sign() != Sign::Plus {
        return Err(AmountError::NonPositiveAmount);
    }
    check_magnitude(amount)?;

    let scaled = amount.clone() * BigDecimal::new(BigInt::from(1), -(TFT_DECIMALS as i64));
    if !scaled.is_integer() {
        return Err(AmountError::ExcessPrecision {
            max_decimals: TFT_DECIMALS,
        });
    }

    let (digits, _) = scaled.with_scale(0).into_bigint_and_exponent();
    U256::from_str(&digits.to_string()).map_err(|e| AmountError::Malformed(e.to_string()))
}

/// Parse user input into a decimal amount
pub fn parse_amount(input: &str) -> Result<BigDecimal, AmountError> {
    let trimmed = input.trim();
    let amount =
        BigDecimal::from_str(trimmed).map_err(|_| AmountError::Malformed(trimmed.to_string()))?;
    check_magnitude(&amount)?;
    Ok(amount)
}

/// Format a raw balance for display, e.g. `12345678` -> `"1.2345678"`
pub fn format_balance(raw: U256) -> String {
    let digits = format!("{:0>width$}", raw.to_string(), width = TFT_DECIMALS as usize + 1);
    let (whole, frac) = digits.split_at(digits.len() - TFT_DECIMALS as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// Format a decimal TFT amount the same way [`format_balance`] does
pub fn format_amount(amount: &BigDecimal) -> String {
    match to_base_units(amount) {
        Ok(raw) => format_balance(raw),
        Err(_) => amount.to_string(),
    }
}
