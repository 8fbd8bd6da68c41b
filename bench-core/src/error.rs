//! Error types for the fixture pipeline

use thiserror::Error;

/// Main error type for fixture operations
#[derive(Debug, Error)]
pub enum BenchError {
    /// Fatal cryptographic configuration failure; surfaces as a server error
    #[error("Problem executing crypto - {0}")]
    Crypto(#[from] CryptoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database operation failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

/// The fatal cipher failure modes. Each maps to a fixed diagnostic written to
/// the response; none is recoverable and none is retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("no such algorithm: {0}")]
    NoSuchAlgorithm(String),

    #[error("no such padding: {0}")]
    NoSuchPadding(String),

    #[error("illegal block size")]
    IllegalBlockSize,

    #[error("bad padding")]
    BadPadding,

    #[error("invalid key")]
    InvalidKey,

    #[error("invalid algorithm parameters")]
    InvalidAlgorithmParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_errors_carry_fixed_diagnostics() {
        let err = BenchError::from(CryptoError::NoSuchAlgorithm("DES/XTS/NoPadding".into()));
        assert_eq!(
            err.to_string(),
            "Problem executing crypto - no such algorithm: DES/XTS/NoPadding"
        );

        let err = BenchError::from(CryptoError::BadPadding);
        assert_eq!(err.to_string(), "Problem executing crypto - bad padding");
    }
}
