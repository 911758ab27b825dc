//! Submission and confirmation of signed staking transactions.
//!
//! A submitted transaction is polled for its receipt at a fixed interval until the
//! receipt appears, the node reports an error for it, or the timeout runs out.
//! Submission itself is never retried.

use std::time::Duration;

use itc_rpc::NodeClient;
use itc_transactions::SignedStakingTransaction;
use itc_types::TxHash;
use itc_utils::format_elapsed;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::WalletConfig;
use crate::error::WalletError;

/// How long to wait for a receipt, and how often to ask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Zero submits without waiting.
    pub timeout: Duration,
    pub interval: Duration,
}

impl ConfirmationPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    pub fn fire_and_forget() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        Self {
            timeout: config.timeout(),
            interval: config.poll_interval(),
        }
    }
}

/// How a submission ended.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmissionOutcome {
    /// Sent without waiting; `reply` is the node's raw answer.
    Submitted { hash: TxHash, reply: Value },
    Confirmed { hash: TxHash, receipt: Value },
}

impl SubmissionOutcome {
    pub fn hash(&self) -> &TxHash {
        match self {
            Self::Submitted { hash, .. } | Self::Confirmed { hash, .. } => hash,
        }
    }
}

/// Send `signed` once and, unless the timeout is zero, wait for its receipt.
pub async fn submit_and_confirm(
    client: &NodeClient,
    endpoint: &str,
    signed: &SignedStakingTransaction,
    policy: ConfirmationPolicy,
) -> Result<SubmissionOutcome, WalletError> {
    let raw = signed.raw_hex()?;
    let reply = client.send_raw_staking_transaction(endpoint, &raw).await?;
    let hash = match reply.as_str().and_then(|s| s.parse::<TxHash>().ok()) {
        Some(hash) => hash,
        None => signed.hash()?,
    };
    info!(%hash, %endpoint, "staking transaction submitted");

    if policy.timeout.is_zero() {
        return Ok(SubmissionOutcome::Submitted { hash, reply });
    }
    let receipt = await_confirmation(client, endpoint, &hash, policy).await?;
    Ok(SubmissionOutcome::Confirmed { hash, receipt })
}

/// Poll for the receipt of `hash`.
///
/// Each round asks for the receipt, then for node-reported errors; a reported error
/// ends the wait at once. Failed polls count as "no receipt yet".
pub async fn await_confirmation(
    client: &NodeClient,
    endpoint: &str,
    hash: &TxHash,
    policy: ConfirmationPolicy,
) -> Result<Value, WalletError> {
    if policy.interval.is_zero() {
        return Err(WalletError::Config("poll interval must be non-zero".into()));
    }

    let mut remaining = policy.timeout;
    loop {
        match client.transaction_receipt(endpoint, hash).await {
            Ok(Some(receipt)) => {
                info!(%hash, "staking transaction confirmed");
                return Ok(receipt);
            }
            Ok(None) => debug!(%hash, remaining_secs = remaining.as_secs(), "no receipt yet"),
            Err(e) => warn!(%hash, error = %e, "receipt poll failed"),
        }

        match client.staking_errors(endpoint, hash).await {
            Ok(errors) if !errors.is_empty() => {
                let errors: Vec<String> = errors.into_iter().map(|e| e.message).collect();
                warn!(%hash, ?errors, "staking transaction rejected");
                return Err(WalletError::TransactionRejected {
                    hash: *hash,
                    errors,
                });
            }
            Ok(_) => {}
            Err(e) => warn!(%hash, error = %e, "staking error lookup failed"),
        }

        if remaining < policy.interval {
            let elapsed = policy.timeout - remaining;
            warn!(%hash, waited = %format_elapsed(elapsed), "no receipt before timeout");
            return Err(WalletError::ConfirmationTimeout {
                hash: *hash,
                elapsed,
            });
        }
        tokio::time::sleep(policy.interval).await;
        remaining -= policy.interval;
    }
}
