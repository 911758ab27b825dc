//! Passphrase-based symmetric encryption of raw key material.
//!
//! Two on-disk formats are understood:
//!
//! 1. **Legacy**: the AES-256 key is the lowercase hex of MD5(passphrase) (32 ASCII bytes),
//!    and the file holds `hex(nonce || ciphertext || tag)` with no metadata. This is the
//!    format every existing key file uses. MD5 is a fast digest, not a password KDF, so
//!    a stolen legacy file is cheap to brute force.
//! 2. **Argon2id envelope**: a JSON document carrying the KDF parameters, salt and nonce,
//!    with the key derived by Argon2id.
//!
//! [`decrypt`] accepts both; [`VaultKdf`] selects which one [`encrypt`] produces.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::{Algorithm, Argon2, Params, Version};
use md5::{Digest, Md5};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// AES-GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

/// Salt length for the Argon2id envelope.
const SALT_LEN: usize = 32;

const ENVELOPE_VERSION: u32 = 1;

/// Which key-derivation scheme new vault files are written with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultKdf {
    /// MD5-derived key, bare hex ciphertext. Readable by every existing tool.
    #[default]
    Legacy,
    /// Argon2id-derived key inside a JSON envelope.
    Argon2id(Argon2Params),
}

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    /// Memory in KiB.
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    /// 64 MB memory, 3 iterations, 1 lane.
    fn default() -> Self {
        Self {
            memory: 65536,
            iterations: 3,
            parallelism: 1,
        }
    }
}

/// Self-contained ciphertext as it is stored on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// The Argon2id envelope, serializable to/from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    crypto: EnvelopeCrypto,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct EnvelopeCrypto {
    cipher: String,
    kdf: String,
    kdf_params: Argon2Params,
    /// Hex-encoded salt.
    salt: String,
    /// Hex-encoded nonce.
    nonce: String,
    /// Hex-encoded ciphertext.
    ciphertext: String,
}

/// Encrypt `plaintext` under `passphrase`.
///
/// Only fails if the OS entropy source does.
pub fn encrypt(
    plaintext: &[u8],
    passphrase: &str,
    kdf: VaultKdf,
) -> Result<EncryptedBlob, CryptoError> {
    match kdf {
        VaultKdf::Legacy => {
            let key = legacy_key(passphrase);
            let nonce = random_bytes::<NONCE_LEN>()?;
            let ciphertext = seal(key.as_bytes(), &nonce, plaintext)?;

            let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
            out.extend_from_slice(&nonce);
            out.extend_from_slice(&ciphertext);
            Ok(EncryptedBlob(hex::encode(out).into_bytes()))
        }
        VaultKdf::Argon2id(params) => {
            let salt = random_bytes::<SALT_LEN>()?;
            let nonce = random_bytes::<NONCE_LEN>()?;
            let key = argon2_key(passphrase, &salt, &params)?;
            let ciphertext = seal(key.as_ref(), &nonce, plaintext)?;

            let envelope = Envelope {
                version: ENVELOPE_VERSION,
                crypto: EnvelopeCrypto {
                    cipher: "aes-256-gcm".to_string(),
                    kdf: "argon2id".to_string(),
                    kdf_params: params,
                    salt: hex::encode(salt),
                    nonce: hex::encode(nonce),
                    ciphertext: hex::encode(ciphertext),
                },
            };
            let json = serde_json::to_vec_pretty(&envelope)
                .map_err(|e| CryptoError::Malformed(format!("envelope serialization: {e}")))?;
            Ok(EncryptedBlob(json))
        }
    }
}

/// Decrypt a vault blob.
///
/// An Argon2id envelope is recognised first. Anything else is treated as the legacy
/// format: hex is tried first, then the raw bytes as binary ciphertext. If both fail
/// the hex attempt's error is returned, since hex is the canonical form.
pub fn decrypt(blob: &[u8], passphrase: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if let Ok(envelope) = serde_json::from_slice::<Envelope>(blob) {
        return open_envelope(&envelope, passphrase);
    }

    let key = legacy_key(passphrase);
    let first_err = match hex::decode(blob.trim_ascii()) {
        Ok(raw) => match open(key.as_bytes(), &raw) {
            Ok(plaintext) => return Ok(plaintext),
            Err(e) => e,
        },
        Err(e) => CryptoError::Malformed(format!("not hex: {e}")),
    };
    open(key.as_bytes(), blob).map_err(|_| first_err)
}

fn open_envelope(envelope: &Envelope, passphrase: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if envelope.version != ENVELOPE_VERSION {
        return Err(CryptoError::Malformed(format!(
            "unsupported envelope version: {}",
            envelope.version
        )));
    }
    let crypto = &envelope.crypto;
    if crypto.kdf != "argon2id" || crypto.cipher != "aes-256-gcm" {
        return Err(CryptoError::Malformed(format!(
            "unsupported scheme {}/{}",
            crypto.kdf, crypto.cipher
        )));
    }
    let decode = |field: &str, value: &str| {
        hex::decode(value).map_err(|e| CryptoError::Malformed(format!("invalid {field} hex: {e}")))
    };
    let salt = decode("salt", &crypto.salt)?;
    let nonce = decode("nonce", &crypto.nonce)?;
    let ciphertext = decode("ciphertext", &crypto.ciphertext)?;
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::Malformed(format!(
            "invalid nonce length: expected {NONCE_LEN}, got {}",
            nonce.len()
        )));
    }

    let key = argon2_key(passphrase, &salt, &crypto.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| CryptoError::Kdf(format!("AES key init failed: {e}")))?;
    cipher
        .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Authentication)
}

/// Open `nonce || ciphertext || tag`.
fn open(key: &[u8], data: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if data.len() < NONCE_LEN {
        return Err(CryptoError::Malformed(format!(
            "ciphertext of {} bytes is shorter than the nonce",
            data.len()
        )));
    }
    let (nonce, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::Kdf(format!("AES key init failed: {e}")))?;
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Authentication)
}

fn seal(key: &[u8], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::Kdf(format!("AES key init failed: {e}")))?;
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::Malformed(format!("encryption failed: {e}")))
}

/// Hex of MD5(passphrase); its 32 ASCII bytes are the AES-256 key.
fn legacy_key(passphrase: &str) -> Zeroizing<String> {
    let digest = Md5::digest(passphrase.as_bytes());
    Zeroizing::new(hex::encode(digest))
}

fn argon2_key(
    passphrase: &str,
    salt: &[u8],
    params: &Argon2Params,
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let params = Params::new(params.memory, params.iterations, params.parallelism, Some(32))
        .map_err(|e| CryptoError::Kdf(format!("Argon2 params error: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, output.as_mut())
        .map_err(|e| CryptoError::Kdf(format!("Argon2 hashing failed: {e}")))?;
    Ok(output)
}

fn random_bytes<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Entropy(e.to_string()))?;
    Ok(bytes)
}
