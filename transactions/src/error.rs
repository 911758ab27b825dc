use itc_crypto::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    /// Bad numeric or field input. Always raised before any disk or network I/O.
    #[error("{0}")]
    Validation(String),

    /// Malformed BLS key, bad proof of possession or wrong signature length.
    #[error("{0}")]
    Format(String),

    #[error("transaction encoding failed: {0}")]
    Encoding(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

impl TransactionError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<CryptoError> for TransactionError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidBlsKey(_) | CryptoError::InvalidBlsSignature(_) => {
                Self::Format(e.to_string())
            }
            other => Self::Signing(other.to_string()),
        }
    }
}

impl From<bincode::Error> for TransactionError {
    fn from(e: bincode::Error) -> Self {
        Self::Encoding(e.to_string())
    }
}
