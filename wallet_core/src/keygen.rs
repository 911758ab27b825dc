//! Shard-affinity BLS key generation.
//!
//! A BLS key belongs to the shard `key mod shard_count`. To get a key for a given
//! shard, fresh keys are sampled until one lands there; with `n` shards this takes
//! `n` tries on average.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use itc_crypto::{BlsKeyPair, CryptoError, VaultKdf};
use itc_rpc::NodeClient;
use itc_types::{BlsPublicKey, ShardId};
use tracing::{debug, info};

use crate::bls_keys::key_file_path;
use crate::error::WalletError;
use crate::keystore::write_key_file;
use crate::passphrase::PassphraseProvider;

/// Limits on the rejection-sampling search. `None` means unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchBudget {
    pub max_attempts: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn attempts(max_attempts: u64) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            time_limit: None,
        }
    }

    pub fn time(limit: Duration) -> Self {
        Self {
            max_attempts: None,
            time_limit: Some(limit),
        }
    }

    fn exhausted(&self, attempts: u64, elapsed: Duration) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
            || self.time_limit.is_some_and(|limit| elapsed >= limit)
    }
}

/// A key together with the shard it resolves to.
#[derive(Debug)]
pub struct ShardKeyAssignment {
    pub key: BlsKeyPair,
    pub shard_id: ShardId,
}

/// A shard-bound key and the vault file it was written to.
#[derive(Debug)]
pub struct GeneratedKey {
    pub assignment: ShardKeyAssignment,
    pub path: PathBuf,
}

/// Sample fresh keys until one resolves to `shard_id`.
pub fn find_key_for_shard(
    shard_id: ShardId,
    shard_count: u32,
    budget: SearchBudget,
) -> Result<ShardKeyAssignment, WalletError> {
    find_key_for_shard_with(shard_id, shard_count, budget, BlsKeyPair::generate)
}

/// [`find_key_for_shard`] with a caller-supplied key source.
///
/// `shard_id` must be below `shard_count`; this is checked before any key is drawn.
pub fn find_key_for_shard_with<F>(
    shard_id: ShardId,
    shard_count: u32,
    budget: SearchBudget,
    mut generate: F,
) -> Result<ShardKeyAssignment, WalletError>
where
    F: FnMut() -> Result<BlsKeyPair, CryptoError>,
{
    if shard_id >= shard_count {
        return Err(WalletError::InvalidShard {
            node: None,
            shard_id,
            shard_count,
        });
    }

    let started = Instant::now();
    let mut attempts = 0u64;
    loop {
        let key = generate()?;
        attempts += 1;
        if key.public_key().shard_id(shard_count) == shard_id {
            debug!(shard_id, attempts, "found key for shard");
            return Ok(ShardKeyAssignment { key, shard_id });
        }
        let elapsed = started.elapsed();
        if budget.exhausted(attempts, elapsed) {
            return Err(WalletError::BudgetExceeded {
                shard_id,
                attempts,
                elapsed,
            });
        }
    }
}

/// Generate `count` keys bound to `shard_id` and write each to its own vault file.
///
/// The shard count comes from `node`'s topology; an out-of-range shard fails before
/// any sampling. The passphrase provider is asked once per key.
#[allow(clippy::too_many_arguments)]
pub async fn generate_shard_keys(
    client: &NodeClient,
    node: &str,
    shard_id: ShardId,
    count: usize,
    budget: SearchBudget,
    provider: &dyn PassphraseProvider,
    key_dir: Option<&Path>,
    kdf: VaultKdf,
) -> Result<Vec<GeneratedKey>, WalletError> {
    let shard_count = shard_count(client, node).await?;
    if shard_id >= shard_count {
        return Err(WalletError::InvalidShard {
            node: Some(node.to_string()),
            shard_id,
            shard_count,
        });
    }

    let mut generated = Vec::with_capacity(count);
    for _ in 0..count {
        let assignment = find_key_for_shard(shard_id, shard_count, budget)?;
        let public_key = assignment.key.public_key();
        let target = key_file_path(&public_key, None, key_dir)?;
        let passphrase = provider.passphrase(&format!("bls key {public_key}"))?;
        let path = write_key_file(&assignment.key, &passphrase, &target, kdf)?;
        info!(shard_id, public_key = %public_key, "generated shard key");
        generated.push(GeneratedKey { assignment, path });
    }
    Ok(generated)
}

/// The shard `key` would be assigned to under `node`'s current topology.
pub async fn shard_for_bls_key(
    client: &NodeClient,
    node: &str,
    key: &BlsPublicKey,
) -> Result<ShardId, WalletError> {
    let shard_count = shard_count(client, node).await?;
    if shard_count == 0 {
        return Err(WalletError::Validation(format!(
            "node {node} reported no shards"
        )));
    }
    Ok(key.shard_id(shard_count))
}

async fn shard_count(client: &NodeClient, node: &str) -> Result<u32, WalletError> {
    let topology = client.sharding_structure(node).await?;
    u32::try_from(topology.len())
        .map_err(|_| WalletError::Validation(format!("node {node} reported too many shards")))
}
