//! Conversion between human-scale decimal amounts and integer base units.
//!
//! Exact decimal arithmetic only; no binary floating point touches amounts.

use chain_eth::U256;
use rust_decimal::Decimal;

use crate::error::WalletError;

/// Largest scale a `Decimal` can carry.
const MAX_DECIMAL_SCALE: u32 = 28;

/// `amount * 10^decimals`, truncating digits beyond `decimals`.
///
/// Negative amounts are rejected.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256, WalletError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(WalletError::Validation(format!(
            "amount must not be negative: {amount}"
        )));
    }

    let mantissa = amount.mantissa().unsigned_abs();
    let scale = amount.scale();

    if scale > decimals {
        // scale <= 28, so the divisor fits in u128.
        let divisor = 10u128.pow(scale - decimals);
        return Ok(U256::from(mantissa / divisor));
    }

    U256::from(mantissa)
        .checked_mul(pow10(decimals - scale)?)
        .ok_or_else(|| WalletError::Validation(format!("amount {amount} overflows base units")))
}

/// `units / 10^decimals` as an exact decimal, normalized (no trailing zeros).
///
/// Values wider than 96 bits exceed `Decimal`'s range and are rejected.
pub fn to_decimal(units: U256, decimals: u32) -> Result<Decimal, WalletError> {
    if decimals > MAX_DECIMAL_SCALE {
        return Err(WalletError::Validation(format!(
            "{decimals} decimals exceeds supported scale"
        )));
    }
    if units.bit_len() > 96 {
        return Err(WalletError::Validation(format!(
            "amount {units} exceeds decimal range"
        )));
    }

    let raw = u128::try_from(units)
        .map_err(|_| WalletError::Internal(format!("amount {units} exceeds u128")))?;
    let value = Decimal::try_from_i128_with_scale(raw as i128, decimals)
        .map_err(|e| WalletError::Internal(format!("decimal conversion: {e}")))?;
    Ok(value.normalize())
}

fn pow10(exp: u32) -> Result<U256, WalletError> {
    U256::from(10u8)
        .checked_pow(U256::from(exp))
        .ok_or_else(|| WalletError::Validation(format!("10^{exp} overflows base units")))
}
