use thiserror::Error;

use chain_eth::EthError;
use chain_tron::TronError;
use crypto_utils::CryptoError;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Entropy unavailable: {0}")]
    Entropy(String),

    #[error("Key derivation failed at {segment}: {reason}")]
    Derivation { segment: &'static str, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: String, requested: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Broadcast rejected: {0}")]
    Broadcast(String),

    /// Sent to the node, verdict unknown. Query `tx_id` before retrying.
    #[error("Transaction {tx_id} sent, outcome unknown: {reason}")]
    OutcomeUnknown { tx_id: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Transport-level failures where nothing was sent; the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::Network(_) | WalletError::Timeout(_))
    }
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::EntropyUnavailable(msg) => WalletError::Entropy(msg),
            other => WalletError::Internal(other.to_string()),
        }
    }
}

impl From<EthError> for WalletError {
    fn from(e: EthError) -> Self {
        match e {
            EthError::InvalidAddress(msg) => WalletError::Validation(format!("EVM: {msg}")),
            EthError::Network(msg) => WalletError::Network(format!("EVM: {msg}")),
            EthError::Timeout(msg) => WalletError::Timeout(format!("EVM: {msg}")),
            EthError::Rpc { code, message } => {
                WalletError::Network(format!("EVM rpc {code}: {message}"))
            }
            EthError::Broadcast(msg) => WalletError::Broadcast(format!("EVM: {msg}")),
            EthError::OutcomeUnknown { tx_hash, reason } => WalletError::OutcomeUnknown {
                tx_id: tx_hash,
                reason,
            },
            other => WalletError::Internal(format!("EVM: {other}")),
        }
    }
}

impl From<TronError> for WalletError {
    fn from(e: TronError) -> Self {
        match e {
            TronError::InvalidAddress(msg) => WalletError::Validation(format!("TRON: {msg}")),
            TronError::Network(msg) => WalletError::Network(format!("TRON: {msg}")),
            TronError::Timeout(msg) => WalletError::Timeout(format!("TRON: {msg}")),
            TronError::Rpc { code, message } => {
                WalletError::Network(format!("TRON rpc {code}: {message}"))
            }
            TronError::NotFound(msg) => WalletError::NotFound(msg),
            TronError::Build(msg) => WalletError::Broadcast(format!("TRON build: {msg}")),
            TronError::Broadcast { code, message } => {
                WalletError::Broadcast(format!("TRON {code}: {message}"))
            }
            TronError::OutcomeUnknown { tx_id, reason } => {
                WalletError::OutcomeUnknown { tx_id, reason }
            }
            other => WalletError::Internal(format!("TRON: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_error_names_segment() {
        let err = WalletError::Derivation {
            segment: "coin type",
            reason: "invalid child".into(),
        };
        assert_eq!(
            err.to_string(),
            "Key derivation failed at coin type: invalid child"
        );
    }

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(WalletError::Network("x".into()).is_retryable());
        assert!(WalletError::Timeout("x".into()).is_retryable());
        assert!(!WalletError::Broadcast("x".into()).is_retryable());
        assert!(!WalletError::OutcomeUnknown {
            tx_id: "ab".into(),
            reason: "x".into()
        }
        .is_retryable());
        assert!(!WalletError::InvalidMnemonic("x".into()).is_retryable());
    }

    #[test]
    fn eth_outcome_unknown_keeps_hash() {
        let err: WalletError = EthError::OutcomeUnknown {
            tx_hash: "0xabc".into(),
            reason: "timeout".into(),
        }
        .into();
        assert!(matches!(err, WalletError::OutcomeUnknown { ref tx_id, .. } if tx_id == "0xabc"));
    }

    #[test]
    fn tron_broadcast_maps_to_broadcast() {
        let err: WalletError = TronError::Broadcast {
            code: "Success".into(),
            message: "tx send fail".into(),
        }
        .into();
        assert!(matches!(err, WalletError::Broadcast(_)));
    }

    #[test]
    fn tron_not_found_maps_to_not_found() {
        let err: WalletError = TronError::NotFound("asset 1002000".into()).into();
        assert!(matches!(err, WalletError::NotFound(_)));
    }

    #[test]
    fn entropy_error_maps_to_entropy() {
        let err: WalletError = CryptoError::EntropyUnavailable("no rng".into()).into();
        assert!(matches!(err, WalletError::Entropy(_)));
    }
}
