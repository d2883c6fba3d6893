use alloy_primitives::U256;

use crate::abi::{encode_function_call, selector, AbiParam};
use crate::address::parse_address;
use crate::error::EthError;

/// Canonical signature of the token transfer method.
pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// Canonical signature of the token balance view.
pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";

/// Encodes `transfer(address,uint256)` for a raw 20-byte recipient.
///
/// TRON contracts take the same call data once the 0x41 prefix is stripped.
pub fn encode_transfer_raw(to: [u8; 20], amount: U256) -> Vec<u8> {
    encode_function_call(
        selector(TRANSFER_SIGNATURE),
        &[AbiParam::Address(to), AbiParam::Uint256(amount)],
    )
}

/// Encodes `transfer(address,uint256)` for a hex recipient.
pub fn encode_transfer(to: &str, amount: U256) -> Result<Vec<u8>, EthError> {
    Ok(encode_transfer_raw(parse_address(to)?, amount))
}

/// Encodes `balanceOf(address)` for a raw 20-byte owner.
pub fn encode_balance_of_raw(owner: [u8; 20]) -> Vec<u8> {
    encode_function_call(selector(BALANCE_OF_SIGNATURE), &[AbiParam::Address(owner)])
}

/// Encodes `balanceOf(address)` for a hex owner.
pub fn encode_balance_of(owner: &str) -> Result<Vec<u8>, EthError> {
    Ok(encode_balance_of_raw(parse_address(owner)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

    #[test]
    fn encode_transfer_layout() {
        let data = encode_transfer(DEAD, U256::from(100u64)).unwrap();

        assert_eq!(data.len(), 68);
        assert_eq!(hex::encode(&data[..4]), "a9059cbb");
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(data[34], 0xde);
        assert_eq!(data[35], 0xad);
        assert_eq!(data[67], 0x64);
        assert_eq!(&data[36..67], &[0u8; 31]);
    }

    #[test]
    fn encode_transfer_six_decimal_amount() {
        // 1.5 USDT at 6 decimals = 1_500_000 = 0x16e360
        let data = encode_transfer(DEAD, U256::from(1_500_000u64)).unwrap();
        assert!(hex::encode(&data[36..68]).ends_with("16e360"));
    }

    #[test]
    fn encode_transfer_invalid_address() {
        assert!(encode_transfer("not-an-address", U256::ZERO).is_err());
    }

    #[test]
    fn encode_balance_of_layout() {
        let data = encode_balance_of(DEAD).unwrap();
        assert_eq!(data.len(), 36);
        assert_eq!(hex::encode(&data[..4]), "70a08231");
    }

    #[test]
    fn raw_and_hex_forms_agree() {
        let mut raw = [0u8; 20];
        raw[18] = 0xde;
        raw[19] = 0xad;
        assert_eq!(
            encode_transfer_raw(raw, U256::from(7u64)),
            encode_transfer(DEAD, U256::from(7u64)).unwrap()
        );
    }
}
