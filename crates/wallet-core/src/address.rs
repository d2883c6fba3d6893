use k256::ecdsa::SigningKey;

use crate::error::WalletError;
use crate::hd_derivation::PrivateKey;
use crate::types::Network;

/// Derive the address of `key` on a given network
pub fn derive_address(key: &PrivateKey, network: Network) -> Result<String, WalletError> {
    match network {
        Network::Eth => evm_address(key),
        Network::Tron => tron_address(key),
    }
}

/// EIP-55 checksummed `0x` address
pub fn evm_address(key: &PrivateKey) -> Result<String, WalletError> {
    let pubkey = uncompressed_public_key(key)?;
    chain_eth::address::pubkey_to_address(&pubkey).map_err(WalletError::from)
}

/// Base58check `T...` address
pub fn tron_address(key: &PrivateKey) -> Result<String, WalletError> {
    let pubkey = uncompressed_public_key(key)?;
    chain_tron::address::pubkey_to_address(&pubkey).map_err(WalletError::from)
}

/// Compares addresses the way each chain renders them: EVM by value
/// (checksum case ignored), TRON by exact base58 string.
pub fn same_address(network: Network, a: &str, b: &str) -> bool {
    match network {
        Network::Eth => chain_eth::address::same_address(a, b),
        Network::Tron => a == b,
    }
}

fn uncompressed_public_key(key: &PrivateKey) -> Result<[u8; 65], WalletError> {
    let signing_key = SigningKey::from_bytes(key.expose().into())
        .map_err(|e| WalletError::Internal(format!("invalid derived key: {e}")))?;

    signing_key
        .verifying_key()
        .to_encoded_point(false)
        .as_bytes()
        .try_into()
        .map_err(|_| WalletError::Internal("invalid uncompressed public key".into()))
}
