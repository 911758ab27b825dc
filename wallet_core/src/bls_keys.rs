//! BLS slot key files and proofs of possession.

use std::path::{Path, PathBuf};

use itc_crypto::{BlsKeyPair, VaultKdf};
use itc_transactions::{assert_option_string, StakingIntent};
use itc_types::{BlsPublicKey, BlsSignature};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::WalletError;
use crate::keystore::{default_key_path, pass_file_path, read_key_file, write_key_file};
use crate::passphrase::PassphraseProvider;

/// Where a key file goes: the explicit `path`, or `<dir>/<hex>.key` with `dir`
/// defaulting to the working directory.
pub fn key_file_path(
    public_key: &BlsPublicKey,
    path: Option<&Path>,
    key_dir: Option<&Path>,
) -> Result<PathBuf, WalletError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    let dir = match key_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(|e| WalletError::io(".", e))?,
    };
    Ok(default_key_path(&dir, &public_key.to_hex()))
}

/// Generate an unbound BLS key and write it to a vault file.
pub fn generate_bls_key(
    provider: &dyn PassphraseProvider,
    path: Option<&Path>,
    key_dir: Option<&Path>,
    kdf: VaultKdf,
) -> Result<(BlsKeyPair, PathBuf), WalletError> {
    let key = BlsKeyPair::generate()?;
    let target = key_file_path(&key.public_key(), path, key_dir)?;
    let passphrase = provider.passphrase(&format!("bls key {}", key.public_key()))?;
    let written = write_key_file(&key, &passphrase, &target, kdf)?;
    Ok((key, written))
}

/// Encrypt an existing private key (hex, `0x` optional) into a vault file.
pub fn save_bls_key(
    private_hex: &str,
    provider: &dyn PassphraseProvider,
    path: Option<&Path>,
    key_dir: Option<&Path>,
    kdf: VaultKdf,
) -> Result<(BlsPublicKey, PathBuf), WalletError> {
    let key = BlsKeyPair::from_secret_hex(private_hex)?;
    let target = key_file_path(&key.public_key(), path, key_dir)?;
    let passphrase = provider.passphrase(&format!("bls key {}", key.public_key()))?;
    let written = write_key_file(&key, &passphrase, &target, kdf)?;
    Ok((key.public_key(), written))
}

/// Decrypt a BLS key from an absolute vault path.
pub fn recover_bls_key(
    path: &Path,
    provider: &dyn PassphraseProvider,
) -> Result<BlsKeyPair, WalletError> {
    if !path.is_absolute() {
        return Err(WalletError::Path(path.to_path_buf()));
    }
    let passphrase = provider.passphrase(&path.display().to_string())?;
    read_key_file(path, &passphrase)
}

pub fn bls_public_key_from_private(private_hex: &str) -> Result<BlsPublicKey, WalletError> {
    Ok(BlsKeyPair::from_secret_hex(private_hex)?.public_key())
}

/// Parse user-supplied BLS public keys, rejecting swallowed flags.
pub fn parse_bls_keys<S: AsRef<str>>(raw: &[S]) -> Result<Vec<BlsPublicKey>, WalletError> {
    raw.iter()
        .map(|s| {
            let s = s.as_ref();
            assert_option_string(s)?;
            BlsPublicKey::from_hex(s).map_err(|e| WalletError::Format(e.to_string()))
        })
        .collect()
}

/// Load the private key behind `public_key` and sign its proof of possession.
///
/// With `key_dir`, both `<hex>.key` and `<hex>.pass` are read from it. Without, the
/// key is read from the working directory and the passphrase comes from `provider`.
pub fn bls_proof(
    public_key: &BlsPublicKey,
    key_dir: Option<&Path>,
    provider: &dyn PassphraseProvider,
) -> Result<BlsSignature, WalletError> {
    let hex = public_key.to_hex();
    let key: BlsKeyPair = match key_dir {
        Some(dir) => {
            let key_path = default_key_path(dir, &hex);
            if !key_path.exists() {
                return Err(WalletError::NotFound(format!(
                    "no key file found for bls key {hex} in {}",
                    dir.display()
                )));
            }
            let pass_path = pass_file_path(dir, &hex);
            if !pass_path.exists() {
                return Err(WalletError::NotFound(format!(
                    "no passphrase file found for bls key {hex} in {}",
                    dir.display()
                )));
            }
            let passphrase = read_pass_file(&pass_path)?;
            read_key_file(&key_path, &passphrase)?
        }
        None => {
            let dir = std::env::current_dir().map_err(|e| WalletError::io(".", e))?;
            let passphrase = provider.passphrase(&format!("bls key {hex}"))?;
            read_key_file(&default_key_path(&dir, &hex), &passphrase)?
        }
    };

    if key.public_key() != *public_key {
        return Err(WalletError::Format("bls key could not be verified".into()));
    }
    debug!(public_key = %hex, "signed proof of possession");
    Ok(key.proof_of_possession())
}

/// Proofs for several keys, in order.
pub fn bls_proofs(
    public_keys: &[BlsPublicKey],
    key_dir: Option<&Path>,
    provider: &dyn PassphraseProvider,
) -> Result<Vec<BlsSignature>, WalletError> {
    public_keys
        .iter()
        .map(|key| bls_proof(key, key_dir, provider))
        .collect()
}

/// Fill in missing proofs of possession for the slot keys an intent adds.
pub fn fill_slot_key_proofs(
    intent: &mut StakingIntent,
    key_dir: Option<&Path>,
    provider: &dyn PassphraseProvider,
) -> Result<(), WalletError> {
    match intent {
        StakingIntent::CreateValidator(p) if p.slot_key_sigs.is_empty() => {
            p.slot_key_sigs = bls_proofs(&p.slot_pub_keys, key_dir, provider)?;
        }
        StakingIntent::EditValidator(p) => {
            if let (Some(key), None) = (&p.slot_key_to_add, &p.slot_key_to_add_sig) {
                p.slot_key_to_add_sig = Some(bls_proof(key, key_dir, provider)?);
            }
        }
        _ => {}
    }
    Ok(())
}

/// `.pass` files are trimmed and have tabs removed.
fn read_pass_file(path: &Path) -> Result<Zeroizing<String>, WalletError> {
    let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| WalletError::io(path, e))?);
    Ok(Zeroizing::new(raw.trim().replace('\t', "")))
}
