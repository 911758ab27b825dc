//! Fundamental types for Intelchain staking tooling.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, fixed-point decimals, serialized BLS keys, transaction hashes and
//! chain identifiers.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;

pub use address::Address;
pub use amount::{Dec, ATTO_PER_ITC, ATTO_PER_NANO};
pub use error::TypesError;
pub use hash::TxHash;
pub use keys::{BlsPublicKey, BlsSignature, BLS_PUBLIC_KEY_SIZE, BLS_SIGNATURE_SIZE};
pub use network::ChainId;

/// Identifier of a shard.
pub type ShardId = u32;

/// Strip an optional `0x`/`0X` prefix from a hex string.
pub fn trim_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
