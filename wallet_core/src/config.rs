//! Wallet configuration with TOML file support.
//!
//! One [`WalletConfig`] is read at start and passed by reference into every operation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use itc_crypto::{Argon2Params, VaultKdf};
use itc_rpc::{EndpointRewrites, HttpTransport, NodeClient};
use itc_types::{ChainId, Dec};
use itc_utils::{init_logging, LogFormat};

use crate::error::WalletError;

/// Configuration for the staking wallet.
///
/// Can be loaded from a TOML file via [`WalletConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Node to talk to. An IP-literal URL pins every call to that one node.
    #[serde(default = "default_node")]
    pub node: String,

    /// Network the transactions are signed for.
    #[serde(default)]
    pub chain: ChainId,

    /// Seconds to wait for a receipt. 0 submits without waiting.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Gas price in nano-ITC.
    #[serde(default = "default_gas_price")]
    pub gas_price: Dec,

    /// Explicit gas limit. Intrinsic gas is used when unset.
    #[serde(default)]
    pub gas_limit: Option<u64>,

    #[serde(default)]
    pub nonce: NoncePolicy,

    /// Format for newly written key files.
    #[serde(default)]
    pub vault_kdf: VaultFormat,

    /// Argon2id cost when `vault_kdf = "argon2id"`.
    #[serde(default)]
    pub argon2: Argon2Params,

    /// Directory holding `<bls-public-key>.key` and `.pass` files.
    #[serde(default)]
    pub bls_key_dir: Option<PathBuf>,

    #[serde(default)]
    pub passphrase: PassphraseSource,

    /// Sign with the hardware signer instead of a local key file.
    /// Read by [`crate::signer::signer_from_config`].
    #[serde(default)]
    pub hardware_signer: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Extra local-to-public endpoint rewrites, on top of the built-in table.
    #[serde(default)]
    pub endpoint_rewrites: HashMap<String, String>,
}

/// Which account nonce a transaction uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NonceRepr", into = "NonceRepr")]
pub enum NoncePolicy {
    /// Next nonce including pool transactions.
    #[default]
    Pending,
    /// Confirmed on-chain nonce.
    Latest,
    Explicit(u64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum NonceRepr {
    Explicit(u64),
    Tag(String),
}

impl TryFrom<NonceRepr> for NoncePolicy {
    type Error = String;

    fn try_from(repr: NonceRepr) -> Result<Self, Self::Error> {
        match repr {
            NonceRepr::Explicit(n) => Ok(Self::Explicit(n)),
            NonceRepr::Tag(tag) => match tag.as_str() {
                "pending" => Ok(Self::Pending),
                "latest" => Ok(Self::Latest),
                other => other
                    .parse()
                    .map(Self::Explicit)
                    .map_err(|_| format!("invalid nonce `{other}`, expected pending, latest or a number")),
            },
        }
    }
}

impl From<NoncePolicy> for NonceRepr {
    fn from(policy: NoncePolicy) -> Self {
        match policy {
            NoncePolicy::Pending => Self::Tag("pending".into()),
            NoncePolicy::Latest => Self::Tag("latest".into()),
            NoncePolicy::Explicit(n) => Self::Explicit(n),
        }
    }
}

/// Key file format selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultFormat {
    #[default]
    Legacy,
    Argon2id,
}

/// Where passphrases come from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PassphraseRepr", into = "PassphraseRepr")]
pub enum PassphraseSource {
    /// The built-in default passphrase (empty).
    #[default]
    Default,
    /// Ask on the terminal.
    Prompt,
    /// Read from a file.
    File(PathBuf),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PassphraseRepr {
    Named(String),
    File { file: PathBuf },
}

impl TryFrom<PassphraseRepr> for PassphraseSource {
    type Error = String;

    fn try_from(repr: PassphraseRepr) -> Result<Self, Self::Error> {
        match repr {
            PassphraseRepr::File { file } => Ok(Self::File(file)),
            PassphraseRepr::Named(name) => match name.as_str() {
                "default" => Ok(Self::Default),
                "prompt" => Ok(Self::Prompt),
                other => Err(format!(
                    "invalid passphrase source `{other}`, expected default, prompt or {{ file = \"...\" }}"
                )),
            },
        }
    }
}

impl From<PassphraseSource> for PassphraseRepr {
    fn from(source: PassphraseSource) -> Self {
        match source {
            PassphraseSource::Default => Self::Named("default".into()),
            PassphraseSource::Prompt => Self::Named("prompt".into()),
            PassphraseSource::File(file) => Self::File { file },
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_node() -> String {
    "http://localhost:9500".to_string()
}

fn default_timeout_secs() -> u64 {
    40
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_gas_price() -> Dec {
    Dec::from_int(100)
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl WalletConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        let config: Self = toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    fn check(&self) -> Result<(), WalletError> {
        if self.poll_interval_secs == 0 {
            return Err(WalletError::Config(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// The vault scheme new key files are written with.
    pub fn vault_kdf(&self) -> VaultKdf {
        match self.vault_kdf {
            VaultFormat::Legacy => VaultKdf::Legacy,
            VaultFormat::Argon2id => VaultKdf::Argon2id(self.argon2),
        }
    }

    /// Built-in rewrites plus the configured extras.
    pub fn endpoint_rewrites(&self) -> EndpointRewrites {
        let mut rewrites = EndpointRewrites::default();
        rewrites.extend(self.endpoint_rewrites.clone());
        rewrites
    }

    /// An HTTP node client using the configured endpoint rewrites.
    pub fn node_client(&self) -> Result<NodeClient, WalletError> {
        let transport = HttpTransport::new()?;
        Ok(NodeClient::with_rewrites(
            Arc::new(transport),
            self.endpoint_rewrites(),
        ))
    }

    /// Install the global tracing subscriber per `log_format` and `log_level`.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been set.
    pub fn init_logging(&self) {
        init_logging(self.log_format, &self.log_level);
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            node: default_node(),
            chain: ChainId::default(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            gas_price: default_gas_price(),
            gas_limit: None,
            nonce: NoncePolicy::default(),
            vault_kdf: VaultFormat::default(),
            argon2: Argon2Params::default(),
            bls_key_dir: None,
            passphrase: PassphraseSource::default(),
            hardware_signer: false,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            endpoint_rewrites: HashMap::new(),
        }
    }
}
