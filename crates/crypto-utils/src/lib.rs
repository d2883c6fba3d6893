//! # crypto-utils
//!
//! Secret containers with guaranteed wipe-on-drop and fallible OS entropy
//! for the HD wallet engine.

pub mod error;
pub mod random;
pub mod zeroizing;

pub use error::CryptoError;
pub use zeroizing::{SecretBytes, SecretKeyBytes, SecretString};
