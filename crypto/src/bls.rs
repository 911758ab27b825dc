//! BLS12-381 validator slot keys (min-pk: 48-byte public keys, 96-byte signatures).
//!
//! A validator proves it holds the secret for each slot key it registers by signing a
//! fixed verification message. The network checks that proof before accepting the key.

use blst::min_pk::{PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use itc_types::{BlsPublicKey, BlsSignature};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::CryptoError;
use crate::hash::keccak256;

/// Domain separation tag for hash-to-curve (G2, proof-of-possession ciphersuite).
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// The message a proof of possession signs, after Keccak-256.
pub const BLS_VERIFICATION_MESSAGE: &[u8] = b"intelchain-itc";

/// A BLS secret key with its compressed public key.
pub struct BlsKeyPair {
    secret: SecretKey,
    public: BlsPublicKey,
}

impl BlsKeyPair {
    /// Generate a fresh key from OS randomness.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut ikm = Zeroizing::new([0u8; 32]);
        OsRng
            .try_fill_bytes(ikm.as_mut())
            .map_err(|e| CryptoError::Entropy(e.to_string()))?;
        let secret = SecretKey::key_gen(ikm.as_ref(), &[])
            .map_err(|e| CryptoError::InvalidBlsKey(format!("key generation failed: {e:?}")))?;
        Ok(Self::from_secret(secret))
    }

    /// Rebuild a key pair from the 32-byte big-endian secret scalar.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_bytes(bytes)
            .map_err(|e| CryptoError::InvalidBlsKey(format!("bad secret key: {e:?}")))?;
        Ok(Self::from_secret(secret))
    }

    /// Rebuild from hex (with or without `0x`).
    pub fn from_secret_hex(s: &str) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(itc_types::trim_hex_prefix(s.trim()))
            .map_err(|e| CryptoError::InvalidBlsKey(format!("secret key is not hex: {e}")))?;
        let result = Self::from_secret_bytes(&bytes);
        bytes.zeroize();
        result
    }

    fn from_secret(secret: SecretKey) -> Self {
        let public = BlsPublicKey::new(secret.sk_to_pk().compress());
        Self { secret, public }
    }

    pub fn public_key(&self) -> BlsPublicKey {
        self.public
    }

    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret_bytes().as_ref()))
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> BlsSignature {
        BlsSignature::new(self.secret.sign(hash, DST, &[]).compress())
    }

    /// Sign Keccak-256 of [`BLS_VERIFICATION_MESSAGE`].
    pub fn proof_of_possession(&self) -> BlsSignature {
        self.sign_hash(&keccak256(BLS_VERIFICATION_MESSAGE))
    }
}

impl std::fmt::Debug for BlsKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlsKeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Check that `key` is a valid, non-identity G1 point in the prime-order subgroup.
pub fn parse_bls_public_key(key: &BlsPublicKey) -> Result<PublicKey, CryptoError> {
    PublicKey::key_validate(key.as_bytes())
        .map_err(|e| CryptoError::InvalidBlsKey(format!("{key}: {e:?}")))
}

/// Verify that `signature` is a proof of possession for `key`.
pub fn verify_proof_of_possession(
    key: &BlsPublicKey,
    signature: &BlsSignature,
) -> Result<(), CryptoError> {
    let public = parse_bls_public_key(key)?;
    let sig = Signature::from_bytes(signature.as_bytes())
        .map_err(|e| CryptoError::InvalidBlsSignature(format!("{e:?}")))?;
    let message = keccak256(BLS_VERIFICATION_MESSAGE);
    match sig.verify(true, &message, DST, &[], &public, false) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        err => Err(CryptoError::InvalidBlsSignature(format!(
            "proof of possession does not verify for {key}: {err:?}"
        ))),
    }
}
