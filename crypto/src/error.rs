use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("authentication failed: wrong passphrase or corrupted data")]
    Authentication,

    #[error("malformed ciphertext: {0}")]
    Malformed(String),

    #[error("key derivation failed: {0}")]
    Kdf(String),

    #[error("entropy source failure: {0}")]
    Entropy(String),

    #[error("invalid bls key: {0}")]
    InvalidBlsKey(String),

    #[error("invalid bls signature: {0}")]
    InvalidBlsSignature(String),

    #[error("invalid account key: {0}")]
    InvalidAccountKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}
