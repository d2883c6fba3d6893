use thiserror::Error;

/// EVM chain operation errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    /// The request never reached the node (connect failure, bad endpoint).
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid rpc response: {0}")]
    InvalidResponse(String),

    /// The node refused the signed transaction.
    #[error("broadcast rejected: {0}")]
    Broadcast(String),

    /// The signed transaction was written to the node but no verdict came back.
    #[error("transaction {tx_hash} sent, outcome unknown: {reason}")]
    OutcomeUnknown { tx_hash: String, reason: String },
}

impl EthError {
    /// Maps a transport failure, keeping "never sent" apart from timeouts.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EthError::Timeout(err.to_string())
        } else {
            EthError::Network(err.to_string())
        }
    }
}
