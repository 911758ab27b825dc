//! Serialized BLS key and signature types.
//!
//! These are the wire forms used inside staking transactions. Point arithmetic and
//! deserialization into curve points live in `itc-crypto`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::TypesError;
use crate::ShardId;

/// Size of a compressed BLS public key.
pub const BLS_PUBLIC_KEY_SIZE: usize = 48;

/// Size of a compressed BLS signature.
pub const BLS_SIGNATURE_SIZE: usize = 96;

/// A compressed 48-byte BLS public key identifying a validator slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlsPublicKey([u8; BLS_PUBLIC_KEY_SIZE]);

/// A compressed 96-byte BLS signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BlsSignature([u8; BLS_SIGNATURE_SIZE]);

impl BlsPublicKey {
    pub fn new(bytes: [u8; BLS_PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        let arr = bytes.try_into().map_err(|_| TypesError::InvalidLength {
            what: "bls public key",
            expected: BLS_PUBLIC_KEY_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parse hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(crate::trim_hex_prefix(s.trim()))
            .map_err(|e| TypesError::InvalidHex(format!("{s}: {e}")))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BLS_PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Lowercase hex without prefix; this is also the key file stem.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The shard this key resolves to: the key read as a big-endian integer, modulo
    /// `shard_count`.
    ///
    /// `shard_count` must be non-zero.
    pub fn shard_id(&self, shard_count: u32) -> ShardId {
        let modulus = u64::from(shard_count);
        let rem = self
            .0
            .iter()
            .fold(0u64, |acc, &b| ((acc << 8) | u64::from(b)) % modulus);
        rem as ShardId
    }
}

impl BlsSignature {
    pub fn new(bytes: [u8; BLS_SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Wrap an encoded signature. Any length other than 96 bytes is rejected, never padded.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypesError> {
        let arr = bytes.try_into().map_err(|_| TypesError::InvalidLength {
            what: "bls signature",
            expected: BLS_SIGNATURE_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; BLS_SIGNATURE_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsPublicKey({}..)", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for BlsSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsSignature({}..)", hex::encode(&self.0[..6]))
    }
}

impl Serialize for BlsPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlsPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for BlsSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlsSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(crate::trim_hex_prefix(&s)).map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}
