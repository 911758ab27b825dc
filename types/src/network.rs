//! Chain identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Identifies which Intelchain network a transaction is signed for.
///
/// The numeric id is mixed into the signing hash, so a transaction signed for one
/// chain can not be replayed on another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChainId {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
    Custom(u64),
}

impl ChainId {
    pub fn id(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Testnet => 2,
            Self::Devnet => 4,
            Self::Localnet => 2,
            Self::Custom(id) => *id,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Mainnet => "mainnet".into(),
            Self::Testnet => "testnet".into(),
            Self::Devnet => "devnet".into(),
            Self::Localnet => "localnet".into(),
            Self::Custom(id) => id.to_string(),
        }
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::Mainnet
    }
}

impl FromStr for ChainId {
    type Err = TypesError;

    /// Accepts a known network name or a bare numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" => Ok(Self::Localnet),
            other => other
                .parse::<u64>()
                .map(Self::Custom)
                .map_err(|_| TypesError::UnknownChain(s.to_string())),
        }
    }
}

impl TryFrom<String> for ChainId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ChainId> for String {
    fn from(chain: ChainId) -> Self {
        chain.name()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
