//! Intrinsic gas: the fixed cost a transaction pays before any execution.

use crate::error::TransactionError;

/// Base cost of any staking transaction.
pub const TX_GAS: u64 = 21_000;
/// Base cost of a validator creation.
pub const TX_GAS_VALIDATOR_CREATION: u64 = 5_000_000;
/// Cost per non-zero payload byte.
pub const TX_DATA_NON_ZERO_GAS: u64 = 16;
/// Cost per zero payload byte.
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Computes the minimum gas a payload needs.
pub trait GasModel: Send + Sync {
    fn intrinsic_gas(
        &self,
        payload: &[u8],
        is_validator_creation: bool,
    ) -> Result<u64, TransactionError>;
}

/// The network's intrinsic gas schedule.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntrinsicGas;

impl GasModel for IntrinsicGas {
    fn intrinsic_gas(
        &self,
        payload: &[u8],
        is_validator_creation: bool,
    ) -> Result<u64, TransactionError> {
        let base = if is_validator_creation {
            TX_GAS_VALIDATOR_CREATION
        } else {
            TX_GAS
        };
        let zeros = payload.iter().filter(|b| **b == 0).count() as u64;
        let non_zeros = payload.len() as u64 - zeros;

        let overflow = || TransactionError::validation("intrinsic gas overflows u64");
        let data = non_zeros
            .checked_mul(TX_DATA_NON_ZERO_GAS)
            .and_then(|g| g.checked_add(zeros.checked_mul(TX_DATA_ZERO_GAS)?))
            .ok_or_else(overflow)?;
        base.checked_add(data).ok_or_else(overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_costs_base() {
        assert_eq!(IntrinsicGas.intrinsic_gas(&[], false).unwrap(), 21_000);
        assert_eq!(IntrinsicGas.intrinsic_gas(&[], true).unwrap(), 5_000_000);
    }

    #[test]
    fn zero_and_non_zero_bytes_priced_differently() {
        let payload = [0u8, 0, 1, 2, 3];
        assert_eq!(
            IntrinsicGas.intrinsic_gas(&payload, false).unwrap(),
            21_000 + 2 * 4 + 3 * 16
        );
    }

    #[test]
    fn validator_creation_costs_more() {
        let payload = [7u8; 64];
        let create = IntrinsicGas.intrinsic_gas(&payload, true).unwrap();
        let other = IntrinsicGas.intrinsic_gas(&payload, false).unwrap();
        assert_eq!(create - other, 5_000_000 - 21_000);
    }
}
