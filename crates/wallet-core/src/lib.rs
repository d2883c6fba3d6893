//! Multi-chain HD wallet engine for EVM and TRON.
//!
//! A mnemonic is turned into a BIP-39 seed, walked down `m/44'/coin'/0'/0/0`
//! to a single secp256k1 key, and rendered as a chain address. The
//! [`service::WalletService`] holds one long-lived client per chain and runs
//! balance queries and USDT transfers on top of them. Key material lives only
//! for the duration of one request and is wiped on drop.

pub mod address;
pub mod chains;
pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod logging;
pub mod mnemonic;
pub mod service;
pub mod types;
pub mod units;
pub mod validation;

pub use chain_eth::U256;
pub use chains::{ChainClient, EvmChain, TronChain};
pub use config::WalletConfig;
pub use error::WalletError;
pub use service::WalletService;
pub use types::Network;

/// Generate a new 12-word BIP-39 mnemonic
pub fn new_mnemonic() -> Result<String, WalletError> {
    let phrase = mnemonic::generate_mnemonic()?;
    Ok(phrase.to_string())
}
