use std::path::PathBuf;
use std::time::Duration;

use itc_crypto::CryptoError;
use itc_rpc::RpcError;
use itc_transactions::TransactionError;
use itc_types::{Address, ShardId, TxHash};
use itc_utils::format_duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    /// Bad numeric or field input, reported before any disk or network I/O.
    #[error("{0}")]
    Validation(String),

    #[error("authentication failed: wrong passphrase or corrupted key file")]
    Authentication,

    #[error("path must be absolute: {}", .0.display())]
    Path(PathBuf),

    #[error("{0}")]
    NotFound(String),

    /// Corrupt key encoding, malformed BLS key, wrong signature length.
    #[error("{0}")]
    Format(String),

    /// `node` is absent when the shard count was supplied directly.
    #[error("{} only supports a total of {shard_count} shards - supplied shard id {shard_id} isn't valid", shard_source(.node))]
    InvalidShard {
        node: Option<String>,
        shard_id: ShardId,
        shard_count: u32,
    },

    #[error("no key for shard {shard_id} found after {attempts} attempts in {}", format_duration(.elapsed.as_secs()))]
    BudgetExceeded {
        shard_id: ShardId,
        attempts: u64,
        elapsed: Duration,
    },

    #[error("signer address {actual} does not match sender address {expected}")]
    SignerMismatch { expected: Address, actual: Address },

    #[error(transparent)]
    Network(#[from] RpcError),

    #[error(
        "could not confirm {hash} even after {}; try increasing the timeout or look up the receipt with `itc blockchain transaction-receipt {hash}`",
        format_duration(.elapsed.as_secs())
    )]
    ConfirmationTimeout { hash: TxHash, elapsed: Duration },

    #[error("staking transaction {hash} rejected: {}", .errors.join("; "))]
    TransactionRejected { hash: TxHash, errors: Vec<String> },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl WalletError {
    /// Whether retrying or waiting longer may still succeed.
    ///
    /// A timed-out transaction may land later; a transport failure may be transient.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ConfirmationTimeout { .. } | Self::Network(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn shard_source(node: &Option<String>) -> String {
    match node {
        Some(node) => format!("node {node}"),
        None => "the network".to_string(),
    }
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Authentication => Self::Authentication,
            CryptoError::Malformed(_)
            | CryptoError::InvalidBlsKey(_)
            | CryptoError::InvalidBlsSignature(_)
            | CryptoError::InvalidAccountKey(_) => Self::Format(e.to_string()),
            CryptoError::Kdf(_) | CryptoError::Entropy(_) | CryptoError::Signing(_) => {
                Self::Signing(e.to_string())
            }
        }
    }
}

impl From<TransactionError> for WalletError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::Validation(msg) => Self::Validation(msg),
            TransactionError::Format(msg) => Self::Format(msg),
            TransactionError::Encoding(_) | TransactionError::Signing(_) => {
                Self::Signing(e.to_string())
            }
        }
    }
}
