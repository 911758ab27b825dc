//! Staking transactions for Intelchain.
//!
//! Intent kinds:
//! - **CreateValidator**: register a validator with its slot keys and self-delegation
//! - **EditValidator**: change description, rate, bounds, slot keys or eligibility
//! - **Delegate**: stake to a validator
//! - **Undelegate**: withdraw stake from a validator
//! - **CollectRewards**: claim accumulated rewards

pub mod builder;
pub mod error;
pub mod gas;
pub mod staking;
pub mod transaction;
pub mod validation;

pub use builder::{assemble_staking_transaction, build_staking_transaction, BuildParams};
pub use error::TransactionError;
pub use gas::{GasModel, IntrinsicGas};
pub use staking::{
    CollectRewards, CommissionRates, CreateValidator, Delegate, Description, Directive,
    EditValidator, EposStatus, StakingIntent, Undelegate,
};
pub use transaction::{SignedStakingTransaction, StakingTransaction};
pub use validation::{
    assert_option_string, delegation_amount_sanity_check, ensure_length, rate_sanity_check,
    validate_fields, validate_intent, verify_slot_keys,
};
