use chain_eth::address::pubkey_hash20;
use k256::ecdsa::SigningKey;

use crate::error::TronError;

/// Prefix byte of every mainnet TRON address.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// Length of a decoded address: prefix byte plus 20-byte hash.
pub const ADDRESS_LEN: usize = 21;

/// Derives the base58check address for an uncompressed secp256k1 public key.
///
/// The body is the same Keccak-256 hash slice EVM chains use; only the
/// prefix byte and rendering differ.
pub fn pubkey_to_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, TronError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(TronError::InvalidAddress(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    let mut raw = [0u8; ADDRESS_LEN];
    raw[0] = ADDRESS_PREFIX;
    raw[1..].copy_from_slice(&pubkey_hash20(uncompressed_pubkey));
    Ok(encode_address(&raw))
}

/// Derives the address owned by a raw private key.
pub fn private_key_to_address(private_key: &[u8; 32]) -> Result<String, TronError> {
    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|e| TronError::InvalidPrivateKey(e.to_string()))?;
    let point = signing_key.verifying_key().to_encoded_point(false);

    let uncompressed: [u8; 65] = point
        .as_bytes()
        .try_into()
        .map_err(|_| TronError::InvalidPrivateKey("unexpected public key length".into()))?;
    pubkey_to_address(&uncompressed)
}

/// Renders 21 raw address bytes as base58check.
pub fn encode_address(raw: &[u8; ADDRESS_LEN]) -> String {
    bs58::encode(raw).with_check().into_string()
}

/// Decodes a base58check address, verifying checksum, length and prefix.
pub fn decode_address(address: &str) -> Result<[u8; ADDRESS_LEN], TronError> {
    let bytes = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| TronError::InvalidAddress(format!("{address}: {e}")))?;

    let raw: [u8; ADDRESS_LEN] = bytes.as_slice().try_into().map_err(|_| {
        TronError::InvalidAddress(format!(
            "expected {ADDRESS_LEN} bytes, got {}",
            bytes.len()
        ))
    })?;

    if raw[0] != ADDRESS_PREFIX {
        return Err(TronError::InvalidAddress(format!(
            "unexpected prefix byte 0x{:02x}",
            raw[0]
        )));
    }
    Ok(raw)
}

/// The 20-byte body, as used in ABI-encoded contract arguments.
pub fn address_body(address: &str) -> Result<[u8; 20], TronError> {
    let raw = decode_address(address)?;
    let mut body = [0u8; 20];
    body.copy_from_slice(&raw[1..]);
    Ok(body)
}

/// Hex form (`41...`) shown by block explorers.
pub fn to_hex(address: &str) -> Result<String, TronError> {
    Ok(hex::encode(decode_address(address)?))
}

pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_ok()
}
