//! Minimal ABI encoding for contract calls.
//!
//! Only static 32-byte words are supported, which covers token `transfer`
//! and `balanceOf` on both ERC-20 and TRC-20 contracts.

use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// A single ABI-encoded parameter.
#[derive(Debug, Clone)]
pub enum AbiParam {
    /// A 20-byte account, left-padded to 32 bytes.
    Address([u8; 20]),
    /// A 256-bit unsigned integer, big-endian.
    Uint256(U256),
}

/// First four bytes of `keccak256(signature)`, e.g. `transfer(address,uint256)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Encodes `selector || word(params[0]) || word(params[1]) || ...`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param));
    }

    data
}

fn encode_param(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr);
            word
        }
        AbiParam::Uint256(value) => value.to_be_bytes::<32>(),
    }
}

/// Decodes the leading uint256 word of a call's return data.
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    if data.len() < 32 {
        return Err(EthError::EncodingError(format!(
            "expected at least 32 bytes for uint256, got {}",
            data.len()
        )));
    }
    Ok(U256::from_be_slice(&data[..32]))
}
