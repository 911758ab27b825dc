//! End-to-end staking: validate, prove, build, sign, submit.

use itc_rpc::{endpoint_for_shard, is_ip_endpoint, NodeClient, NonceQuery, BEACON_SHARD};
use itc_transactions::{
    assemble_staking_transaction, validate_fields, verify_slot_keys, BuildParams, GasModel,
    StakingIntent, StakingTransaction,
};
use itc_types::Address;
use tracing::info;

use crate::bls_keys::fill_slot_key_proofs;
use crate::config::{NoncePolicy, WalletConfig};
use crate::error::WalletError;
use crate::passphrase::PassphraseProvider;
use crate::signer::{sign_checked, TransactionSigner};
use crate::submit::{submit_and_confirm, ConfirmationPolicy, SubmissionOutcome};

/// The beacon shard endpoint, where staking transactions are sent.
///
/// An IP-literal node is used as given; otherwise the topology's shard 0 is used.
pub async fn beacon_endpoint(client: &NodeClient, node: &str) -> Result<String, WalletError> {
    if is_ip_endpoint(node) {
        return Ok(node.to_string());
    }
    let topology = client.sharding_structure(node).await?;
    endpoint_for_shard(&topology, BEACON_SHARD)
        .map(str::to_string)
        .ok_or_else(|| {
            WalletError::NotFound(format!("node {node} reported no beacon shard endpoint"))
        })
}

pub async fn resolve_nonce(
    client: &NodeClient,
    endpoint: &str,
    sender: &Address,
    policy: NoncePolicy,
) -> Result<u64, WalletError> {
    let query = match policy {
        NoncePolicy::Explicit(nonce) => return Ok(nonce),
        NoncePolicy::Pending => NonceQuery::Pending,
        NoncePolicy::Latest => NonceQuery::Latest,
    };
    Ok(client.transaction_count(endpoint, sender, query).await?)
}

/// Check `intent`, load any missing slot key proofs, fetch the nonce and build.
///
/// Field checks run before any disk or network access.
pub async fn prepare_staking_transaction(
    config: &WalletConfig,
    client: &NodeClient,
    endpoint: &str,
    intent: StakingIntent,
    passphrases: &dyn PassphraseProvider,
    gas: &dyn GasModel,
) -> Result<StakingTransaction, WalletError> {
    validate_fields(&intent)?;
    prepare_checked(config, client, endpoint, intent, passphrases, gas).await
}

/// Build, sign and submit `intent` on the beacon shard, then wait per the configured
/// timeout.
pub async fn send_staking_transaction(
    config: &WalletConfig,
    client: &NodeClient,
    intent: StakingIntent,
    signer: &dyn TransactionSigner,
    passphrases: &dyn PassphraseProvider,
    gas: &dyn GasModel,
) -> Result<SubmissionOutcome, WalletError> {
    validate_fields(&intent)?;
    let directive = intent.directive();
    let endpoint = beacon_endpoint(client, &config.node).await?;
    let tx = prepare_checked(config, client, &endpoint, intent, passphrases, gas).await?;
    let signed = sign_checked(signer, tx, config.chain).await?;
    info!(?directive, %endpoint, "sending staking transaction");
    submit_and_confirm(client, &endpoint, &signed, ConfirmationPolicy::from_config(config)).await
}

/// The rest of preparation once `validate_fields` has passed.
async fn prepare_checked(
    config: &WalletConfig,
    client: &NodeClient,
    endpoint: &str,
    mut intent: StakingIntent,
    passphrases: &dyn PassphraseProvider,
    gas: &dyn GasModel,
) -> Result<StakingTransaction, WalletError> {
    fill_slot_key_proofs(&mut intent, config.bls_key_dir.as_deref(), passphrases)?;
    verify_slot_keys(&intent)?;

    let nonce = resolve_nonce(client, endpoint, &intent.sender(), config.nonce).await?;
    let params = BuildParams {
        nonce,
        gas_price: config.gas_price,
        gas_limit: config.gas_limit,
    };
    Ok(assemble_staking_transaction(intent, &params, gas)?)
}
