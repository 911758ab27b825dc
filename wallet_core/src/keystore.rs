//! Vault key files.
//!
//! A key file holds the encrypted hex of a private key, in whichever vault format
//! [`VaultKdf`] selects. Reading accepts both formats.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use itc_crypto::{AccountKey, BlsKeyPair, CryptoError, VaultKdf};
use tracing::info;
use zeroize::Zeroizing;

use crate::error::WalletError;

/// Extension of BLS key files.
pub const KEY_FILE_EXTENSION: &str = "key";
/// Extension of the passphrase file kept next to a BLS key file.
pub const PASS_FILE_EXTENSION: &str = "pass";

/// A private key that can live in a vault file.
pub trait KeyMaterial: Sized {
    fn secret_hex(&self) -> Zeroizing<String>;
    fn from_secret_hex(hex: &str) -> Result<Self, CryptoError>;
    /// Hex of the public identity: the BLS public key, or the account address.
    fn public_key_hex(&self) -> String;
}

impl KeyMaterial for BlsKeyPair {
    fn secret_hex(&self) -> Zeroizing<String> {
        BlsKeyPair::secret_hex(self)
    }

    fn from_secret_hex(hex: &str) -> Result<Self, CryptoError> {
        BlsKeyPair::from_secret_hex(hex)
    }

    fn public_key_hex(&self) -> String {
        self.public_key().to_hex()
    }
}

impl KeyMaterial for AccountKey {
    fn secret_hex(&self) -> Zeroizing<String> {
        AccountKey::secret_hex(self)
    }

    fn from_secret_hex(hex: &str) -> Result<Self, CryptoError> {
        AccountKey::from_secret_hex(hex)
    }

    fn public_key_hex(&self) -> String {
        self.address().to_hex()
    }
}

/// Encrypt `key` under `passphrase` and write it to `path`.
///
/// `path` must be absolute; a relative path fails before anything touches the disk.
/// The file is created with owner-only permissions on unix and synced before return.
pub fn write_key_file<K: KeyMaterial>(
    key: &K,
    passphrase: &str,
    path: &Path,
    kdf: VaultKdf,
) -> Result<PathBuf, WalletError> {
    if !path.is_absolute() {
        return Err(WalletError::Path(path.to_path_buf()));
    }

    let secret = key.secret_hex();
    let blob = itc_crypto::encrypt(secret.as_bytes(), passphrase, kdf)?;

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|e| WalletError::io(path, e))?;
    file.write_all(blob.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(|e| WalletError::io(path, e))?;

    info!(path = %path.display(), public_key = %key.public_key_hex(), "key file written");
    Ok(path.to_path_buf())
}

/// Read and decrypt a key file.
pub fn read_key_file<K: KeyMaterial>(path: &Path, passphrase: &str) -> Result<K, WalletError> {
    let blob = std::fs::read(path).map_err(|e| {
        WalletError::NotFound(format!("could not read key file {}: {e}", path.display()))
    })?;
    let plaintext = itc_crypto::decrypt(&blob, passphrase)?;
    let hex = std::str::from_utf8(&plaintext)
        .map_err(|_| WalletError::Format(format!("{} does not hold a hex key", path.display())))?;
    K::from_secret_hex(hex).map_err(|e| WalletError::Format(e.to_string()))
}

/// `<dir>/<public-key-hex>.key`.
pub fn default_key_path(dir: &Path, public_key_hex: &str) -> PathBuf {
    dir.join(format!("{public_key_hex}.{KEY_FILE_EXTENSION}"))
}

/// `<dir>/<public-key-hex>.pass`.
pub fn pass_file_path(dir: &Path, public_key_hex: &str) -> PathBuf {
    dir.join(format!("{public_key_hex}.{PASS_FILE_EXTENSION}"))
}
