//! Parse and range errors shared by the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid decimal `{0}`")]
    InvalidDecimal(String),

    #[error("too much precision in `{0}`, at most 18 decimal places are supported")]
    TooMuchPrecision(String),

    #[error("can not be negative: {0}")]
    Negative(String),

    #[error("value out of range: {0}")]
    Overflow(String),

    #[error("unknown chain `{0}`")]
    UnknownChain(String),
}
