use bip32::{ChildNumber, XPrv};
use crypto_utils::SecretKeyBytes;
use zeroize::Zeroize;

use crate::error::WalletError;

/// BIP-32 master key. Owned by a single derivation call and never stored.
pub struct MasterKey(XPrv);

/// A derived secp256k1 scalar, wiped when dropped.
#[derive(Debug)]
pub struct PrivateKey(SecretKeyBytes);

impl PrivateKey {
    pub fn expose(&self) -> &[u8; 32] {
        self.0.expose()
    }
}

/// One step of the fixed five-segment BIP-44 path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment {
    pub name: &'static str,
    pub index: u32,
    pub hardened: bool,
}

/// m/44'/coin_type'/0'/0/0
pub fn path_segments(coin_type: u32) -> [PathSegment; 5] {
    [
        PathSegment { name: "purpose", index: 44, hardened: true },
        PathSegment { name: "coin type", index: coin_type, hardened: true },
        PathSegment { name: "account", index: 0, hardened: true },
        PathSegment { name: "change", index: 0, hardened: false },
        PathSegment { name: "address index", index: 0, hardened: false },
    ]
}

/// Renders the path in the usual `m/44'/60'/0'/0/0` notation.
pub fn derivation_path(coin_type: u32) -> String {
    let mut path = String::from("m");
    for segment in path_segments(coin_type) {
        path.push('/');
        path.push_str(&segment.index.to_string());
        if segment.hardened {
            path.push('\'');
        }
    }
    path
}

/// BIP-32 master key from a BIP-39 seed
pub fn master_key(seed: &[u8]) -> Result<MasterKey, WalletError> {
    XPrv::new(seed)
        .map(MasterKey)
        .map_err(|e| WalletError::Derivation {
            segment: "master key",
            reason: e.to_string(),
        })
}

/// Walks all five segments in order. Any failing step aborts the whole
/// derivation; no intermediate key is returned.
pub fn derive_private_key(master: &MasterKey, coin_type: u32) -> Result<PrivateKey, WalletError> {
    let mut key = master.0.clone();

    for segment in path_segments(coin_type) {
        let child = ChildNumber::new(segment.index, segment.hardened).map_err(|e| {
            WalletError::Derivation {
                segment: segment.name,
                reason: e.to_string(),
            }
        })?;
        key = key.derive_child(child).map_err(|e| WalletError::Derivation {
            segment: segment.name,
            reason: e.to_string(),
        })?;
    }

    let mut bytes = key.to_bytes();
    let secret = SecretKeyBytes::new(bytes);
    bytes.zeroize();
    Ok(PrivateKey(secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::derive_seed;

    // BIP-39 test vector: "abandon" x11 + "about"
    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn test_master() -> MasterKey {
        master_key(&derive_seed(TEST_MNEMONIC).unwrap()).unwrap()
    }

    #[test]
    fn test_path_rendering() {
        assert_eq!(derivation_path(60), "m/44'/60'/0'/0/0");
        assert_eq!(derivation_path(195), "m/44'/195'/0'/0/0");
    }

    #[test]
    fn test_path_is_always_five_segments() {
        let segments = path_segments(60);
        assert_eq!(segments.len(), 5);
        assert_eq!(
            segments.iter().map(|s| s.hardened).collect::<Vec<_>>(),
            vec![true, true, true, false, false]
        );
    }

    #[test]
    fn test_matches_bip32_path_parsing() {
        let seed = derive_seed(TEST_MNEMONIC).unwrap();
        let path: bip32::DerivationPath = "m/44'/60'/0'/0/0".parse().unwrap();
        let expected = XPrv::derive_from_path(&*seed, &path).unwrap();

        let derived = derive_private_key(&master_key(&seed).unwrap(), 60).unwrap();
        assert_eq!(derived.expose(), &expected.to_bytes());
    }

    #[test]
    fn test_known_eth_key() {
        // Widely published key for this mnemonic at m/44'/60'/0'/0/0.
        let key = derive_private_key(&test_master(), 60).unwrap();
        assert_eq!(
            hex::encode(key.expose()),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
    }

    #[test]
    fn test_derivation_deterministic() {
        let master = test_master();
        let key1 = derive_private_key(&master, 60).unwrap();
        let key2 = derive_private_key(&master, 60).unwrap();
        assert_eq!(key1.expose(), key2.expose());
    }

    #[test]
    fn test_different_coin_types_different_keys() {
        let master = test_master();
        let eth = derive_private_key(&master, 60).unwrap();
        let tron = derive_private_key(&master, 195).unwrap();
        assert_ne!(eth.expose(), tron.expose());
    }

    #[test]
    fn test_hardened_coin_type_out_of_range_names_segment() {
        // Indices at or above 2^31 cannot be hardened.
        let err = derive_private_key(&test_master(), 0x8000_0000).unwrap_err();
        match err {
            WalletError::Derivation { segment, .. } => assert_eq!(segment, "coin type"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_short_seed_fails_master_key() {
        assert!(matches!(
            master_key(&[0u8; 8]),
            Err(WalletError::Derivation { segment: "master key", .. })
        ));
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let key = derive_private_key(&test_master(), 60).unwrap();
        assert!(!format!("{key:?}").contains("1ab42cc4"));
    }
}
