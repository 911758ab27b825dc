//! Turns a validated intent into an unsigned [`StakingTransaction`].

use itc_types::{Dec, ATTO_PER_NANO};
use tracing::debug;

use crate::error::TransactionError;
use crate::gas::GasModel;
use crate::staking::StakingIntent;
use crate::transaction::StakingTransaction;
use crate::validation::validate_intent;

/// Everything besides the intent that goes into a transaction.
#[derive(Clone, Debug)]
pub struct BuildParams {
    pub nonce: u64,
    /// Gas price in nano-ITC; truncated to whole atto.
    pub gas_price: Dec,
    /// Explicit gas limit. When absent the intrinsic gas of the payload is used.
    pub gas_limit: Option<u64>,
}

/// Validate `intent` and assemble the unsigned transaction.
///
/// Performs no I/O: the nonce is supplied by the caller and intrinsic gas is a pure
/// function of the payload.
pub fn build_staking_transaction(
    intent: StakingIntent,
    params: &BuildParams,
    gas: &dyn GasModel,
) -> Result<StakingTransaction, TransactionError> {
    validate_intent(&intent)?;
    assemble_staking_transaction(intent, params, gas)
}

/// Assemble an intent that already passed [`validate_intent`].
pub fn assemble_staking_transaction(
    intent: StakingIntent,
    params: &BuildParams,
    gas: &dyn GasModel,
) -> Result<StakingTransaction, TransactionError> {
    let gas_price = params
        .gas_price
        .to_base_units(ATTO_PER_NANO)
        .map_err(|e| TransactionError::validation(format!("invalid gas price: {e}")))?;

    let gas_limit = match params.gas_limit {
        Some(limit) => limit,
        None => {
            let payload = StakingTransaction::payload_bytes(&intent)?;
            gas.intrinsic_gas(&payload, intent.is_validator_creation())?
        }
    };

    debug!(
        directive = ?intent.directive(),
        nonce = params.nonce,
        gas_price,
        gas_limit,
        "built staking transaction"
    );

    Ok(StakingTransaction {
        nonce: params.nonce,
        gas_price,
        gas_limit,
        intent,
    })
}
