//! secp256k1 account keys.
//!
//! The account key signs staking transactions; its address is the last 20 bytes of the
//! Keccak-256 of the uncompressed public key (without the `0x04` tag).

use itc_types::Address;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::hash::keccak256;

/// A recoverable ECDSA signature in `(r, s, v)` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0 or 1; chain-id folding into `v` happens at the transaction layer.
    pub recovery_id: u8,
}

/// An account signing key and its derived address.
pub struct AccountKey {
    signing: SigningKey,
    address: Address,
}

impl AccountKey {
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let signing = SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidAccountKey(e.to_string()))?;
        Ok(Self::from_signing_key(signing))
    }

    pub fn from_secret_hex(s: &str) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(itc_types::trim_hex_prefix(s.trim()))
            .map_err(|e| CryptoError::InvalidAccountKey(format!("secret key is not hex: {e}")))?;
        let result = Self::from_secret_bytes(&bytes);
        bytes.zeroize();
        result
    }

    fn from_signing_key(signing: SigningKey) -> Self {
        let address = address_of(signing.verifying_key());
        Self { signing, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn secret_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.signing.to_bytes().to_vec())
    }

    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret_bytes().as_slice()))
    }

    /// Sign a 32-byte digest, producing a low-s recoverable signature.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<EcdsaSignature, CryptoError> {
        let (sig, recid) = self
            .signing
            .sign_prehash_recoverable(prehash)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);
        Ok(EcdsaSignature {
            r,
            s,
            recovery_id: recid.to_byte(),
        })
    }
}

impl std::fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountKey")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::new(out)
}

/// Recover the signer address from a digest and its signature.
pub fn recover_address(prehash: &[u8; 32], sig: &EcdsaSignature) -> Result<Address, CryptoError> {
    let signature = Signature::from_scalars(sig.r, sig.s)
        .map_err(|e| CryptoError::Signing(format!("malformed signature: {e}")))?;
    let recid = RecoveryId::from_byte(sig.recovery_id)
        .ok_or_else(|| CryptoError::Signing(format!("bad recovery id {}", sig.recovery_id)))?;
    let key = VerifyingKey::recover_from_prehash(prehash, &signature, recid)
        .map_err(|e| CryptoError::Signing(format!("recovery failed: {e}")))?;
    Ok(address_of(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known test vector: secret key 1 maps to this address.
    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn address_derivation_matches_known_vector() {
        let key = AccountKey::from_secret_hex(KEY_ONE).unwrap();
        assert_eq!(
            key.address().to_hex(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn signature_recovers_signer() {
        let key = AccountKey::generate();
        let digest = keccak256(b"staking payload");
        let sig = key.sign_prehash(&digest).unwrap();
        assert!(sig.recovery_id <= 1);
        assert_eq!(recover_address(&digest, &sig).unwrap(), key.address());
    }

    #[test]
    fn different_digest_recovers_different_address() {
        let key = AccountKey::generate();
        let sig = key.sign_prehash(&keccak256(b"a")).unwrap();
        let recovered = recover_address(&keccak256(b"b"), &sig);
        assert!(recovered.map(|a| a != key.address()).unwrap_or(true));
    }

    #[test]
    fn secret_hex_roundtrip() {
        let key = AccountKey::generate();
        let restored = AccountKey::from_secret_hex(&key.secret_hex()).unwrap();
        assert_eq!(restored.address(), key.address());
    }

    #[test]
    fn invalid_secret_rejected() {
        assert!(AccountKey::from_secret_bytes(&[0u8; 32]).is_err());
        assert!(AccountKey::from_secret_hex("xyz").is_err());
    }
}
