use thiserror::Error;
use tonic::{Code, Status};

/// TRON chain operation errors.
#[derive(Debug, Error)]
pub enum TronError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    /// Transport failure; the request did not complete.
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The node answered with a non-transport gRPC status.
    #[error("rpc error {code}: {message}")]
    Rpc { code: String, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// The node refused to build the unsigned transaction.
    #[error("transaction build rejected: {0}")]
    Build(String),

    /// The node rejected the signed transaction.
    #[error("broadcast rejected ({code}): {message}")]
    Broadcast { code: String, message: String },

    /// The broadcast request was sent but no verdict came back.
    #[error("transaction {tx_id} sent, outcome unknown: {reason}")]
    OutcomeUnknown { tx_id: String, reason: String },
}

impl TronError {
    /// Classifies a gRPC status by its code, never by message text.
    pub fn from_status(status: Status) -> Self {
        match status.code() {
            Code::DeadlineExceeded | Code::Cancelled => {
                TronError::Timeout(status.message().to_string())
            }
            Code::Unavailable => TronError::Network(status.message().to_string()),
            code => TronError::Rpc {
                code: format!("{code:?}"),
                message: status.message().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = TronError::InvalidAddress("bad checksum".into());
        assert_eq!(err.to_string(), "invalid address: bad checksum");
    }

    #[test]
    fn display_broadcast() {
        let err = TronError::Broadcast {
            code: "SUCCESS".into(),
            message: "tx send fail".into(),
        };
        assert_eq!(err.to_string(), "broadcast rejected (SUCCESS): tx send fail");
    }

    #[test]
    fn display_outcome_unknown_carries_id() {
        let err = TronError::OutcomeUnknown {
            tx_id: "ab12".into(),
            reason: "deadline".into(),
        };
        assert_eq!(err.to_string(), "transaction ab12 sent, outcome unknown: deadline");
    }

    #[test]
    fn unavailable_status_is_network() {
        let err = TronError::from_status(Status::unavailable("dns error"));
        assert!(matches!(err, TronError::Network(_)));
    }

    #[test]
    fn deadline_and_cancel_are_timeouts() {
        assert!(matches!(
            TronError::from_status(Status::deadline_exceeded("slow")),
            TronError::Timeout(_)
        ));
        assert!(matches!(
            TronError::from_status(Status::cancelled("Timeout expired")),
            TronError::Timeout(_)
        ));
    }

    #[test]
    fn other_status_is_rpc() {
        match TronError::from_status(Status::invalid_argument("bad owner")) {
            TronError::Rpc { code, message } => {
                assert_eq!(code, "InvalidArgument");
                assert_eq!(message, "bad owner");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
