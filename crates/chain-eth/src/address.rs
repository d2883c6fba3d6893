use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Derives the EIP-55 checksummed address for an uncompressed secp256k1
/// public key (65 bytes, `0x04 || x || y`).
///
/// The address is the last 20 bytes of `keccak256(x || y)`.
pub fn pubkey_to_address(uncompressed_pubkey: &[u8; 65]) -> Result<String, EthError> {
    if uncompressed_pubkey[0] != 0x04 {
        return Err(EthError::InvalidPublicKey(
            "uncompressed key must start with 0x04".into(),
        ));
    }

    Ok(checksum_bytes(&pubkey_hash20(uncompressed_pubkey)))
}

/// Derives the checksummed address owned by a raw private key.
pub fn private_key_to_address(private_key: &[u8; 32]) -> Result<String, EthError> {
    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;
    let point = signing_key.verifying_key().to_encoded_point(false);

    let uncompressed: [u8; 65] = point
        .as_bytes()
        .try_into()
        .map_err(|_| EthError::InvalidPublicKey("unexpected public key length".into()))?;
    pubkey_to_address(&uncompressed)
}

/// Last 20 bytes of the Keccak-256 hash of the 64-byte public key body.
///
/// TRON reuses this hash with its own prefix byte.
pub fn pubkey_hash20(uncompressed_pubkey: &[u8; 65]) -> [u8; 20] {
    let hash = Keccak256::digest(&uncompressed_pubkey[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    out
}

/// Parses a `0x`-prefixed 40-hex-digit address into raw bytes.
///
/// Case is not checked here; use [`validate_address`] for EIP-55 checks.
pub fn parse_address(address: &str) -> Result<[u8; 20], EthError> {
    let hex_str = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if hex_str.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_str.len()
        )));
    }

    let bytes =
        hex::decode(hex_str).map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

/// Validates an address string.
///
/// All-lowercase and all-uppercase forms carry no checksum and are accepted;
/// mixed case must match EIP-55 exactly.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let bytes = parse_address(address)?;
    let hex_part = &address[2..];

    let is_all_lower = !hex_part.chars().any(|c| c.is_ascii_uppercase());
    let is_all_upper = !hex_part.chars().any(|c| c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(checksum_bytes(&bytes)[2..] == *hex_part)
}

/// Re-renders any well-formed address with its EIP-55 checksum.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    Ok(checksum_bytes(&parse_address(address)?))
}

/// Compares two addresses by their 20-byte value, ignoring checksum case.
pub fn same_address(a: &str, b: &str) -> bool {
    match (parse_address(a), parse_address(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// EIP-55: a hex letter is uppercased when the matching nibble of
/// `keccak256(lowercase_hex)` is >= 8.
fn checksum_bytes(addr: &[u8; 20]) -> String {
    let lower = hex::encode(addr);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
