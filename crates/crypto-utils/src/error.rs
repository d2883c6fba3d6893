use thiserror::Error;

/// Errors raised while handling secret material.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("secure random source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_entropy_unavailable() {
        let err = CryptoError::EntropyUnavailable("getrandom failed".into());
        assert_eq!(
            err.to_string(),
            "secure random source unavailable: getrandom failed"
        );
    }

    #[test]
    fn display_invalid_key_length() {
        let err = CryptoError::InvalidKeyLength {
            expected: 32,
            actual: 31,
        };
        assert_eq!(
            err.to_string(),
            "invalid key length: expected 32 bytes, got 31"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> =
            Box::new(CryptoError::EntropyUnavailable("test".into()));
        assert!(err.to_string().contains("test"));
    }
}
