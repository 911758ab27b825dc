//! Passphrase providers.
//!
//! Core operations never prompt or read passphrase files themselves; they ask a
//! [`PassphraseProvider`] chosen from the configuration.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::config::{PassphraseSource, WalletConfig};
use crate::error::WalletError;

/// The passphrase used when none is configured.
pub const DEFAULT_PASSPHRASE: &str = "";

/// Supplies a passphrase on request.
///
/// `purpose` names what the passphrase unlocks (e.g. a key file) so interactive
/// providers can say so. Providers may be asked several times in one operation,
/// once per key.
pub trait PassphraseProvider: Send + Sync {
    fn passphrase(&self, purpose: &str) -> Result<Zeroizing<String>, WalletError>;
}

/// Always answers with the same passphrase.
#[derive(Clone)]
pub struct FixedPassphrase(Zeroizing<String>);

impl FixedPassphrase {
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self(Zeroizing::new(passphrase.into()))
    }
}

impl Default for FixedPassphrase {
    fn default() -> Self {
        Self::new(DEFAULT_PASSPHRASE)
    }
}

impl PassphraseProvider for FixedPassphrase {
    fn passphrase(&self, _purpose: &str) -> Result<Zeroizing<String>, WalletError> {
        Ok(self.0.clone())
    }
}

/// Reads the passphrase from a file each time it is asked.
#[derive(Clone, Debug)]
pub struct FilePassphrase {
    path: PathBuf,
}

impl FilePassphrase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PassphraseProvider for FilePassphrase {
    fn passphrase(&self, _purpose: &str) -> Result<Zeroizing<String>, WalletError> {
        read_passphrase_file(&self.path)
    }
}

/// Read a passphrase file, dropping newlines and tabs and trimming the rest.
pub fn read_passphrase_file(path: &Path) -> Result<Zeroizing<String>, WalletError> {
    let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WalletError::NotFound(format!(
                "passphrase file not found at `{}`",
                path.display()
            ))
        } else {
            WalletError::io(path, e)
        }
    })?);
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '\n' | '\t')).collect();
    Ok(Zeroizing::new(cleaned.trim().to_string()))
}

/// Asks on the terminal with hidden input.
#[derive(Clone, Debug, Default)]
pub struct PromptPassphrase {
    /// Ask twice and require both entries to match.
    pub confirm: bool,
}

impl PromptPassphrase {
    pub fn new(confirm: bool) -> Self {
        Self { confirm }
    }
}

impl PassphraseProvider for PromptPassphrase {
    fn passphrase(&self, purpose: &str) -> Result<Zeroizing<String>, WalletError> {
        let term = console::Term::stderr();
        let read = |prompt: &str| -> Result<Zeroizing<String>, WalletError> {
            term.write_str(prompt)
                .and_then(|_| term.read_secure_line())
                .map(Zeroizing::new)
                .map_err(|e| WalletError::io("<terminal>", e))
        };

        let first = read(&format!("Enter passphrase for {purpose}: "))?;
        if self.confirm {
            let second = read("Repeat the passphrase: ")?;
            if *first != *second {
                return Err(WalletError::Validation("passphrase does not match".into()));
            }
        }
        Ok(first)
    }
}

/// The provider named by `config.passphrase`.
///
/// `confirm` applies to prompting only and is set when a new key is being written.
pub fn from_config(config: &WalletConfig, confirm: bool) -> Box<dyn PassphraseProvider> {
    match &config.passphrase {
        PassphraseSource::Default => Box::new(FixedPassphrase::default()),
        PassphraseSource::Prompt => Box::new(PromptPassphrase::new(confirm)),
        PassphraseSource::File(path) => Box::new(FilePassphrase::new(path.clone())),
    }
}
