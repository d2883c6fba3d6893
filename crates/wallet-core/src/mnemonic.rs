use bip39::{Language, Mnemonic};
use crypto_utils::random::try_random_bytes;
use crypto_utils::{SecretBytes, SecretString};
use zeroize::Zeroize;

use crate::error::WalletError;

/// Generate a new 12-word BIP-39 mnemonic (128 bits of entropy)
pub fn generate_mnemonic() -> Result<SecretString, WalletError> {
    let mut entropy: [u8; 16] = try_random_bytes()?;
    let result = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map(|m| SecretString::from(m.to_string()))
        .map_err(|e| WalletError::Internal(format!("mnemonic encoding: {e}")));
    entropy.zeroize();
    result
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Checks words and checksum, then derives the 64-byte seed with an empty passphrase.
///
/// Invalid phrases fail here and never reach key derivation.
pub fn derive_seed(phrase: &str) -> Result<SecretBytes, WalletError> {
    mnemonic_to_seed(phrase, "")
}

/// Derive seed bytes from mnemonic + passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<SecretBytes, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    let mut seed = mnemonic.to_seed(passphrase);
    let secret = SecretBytes::new(seed.to_vec());
    seed.zeroize();
    Ok(secret)
}

/// Validate a single word against the BIP-39 word list
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}
