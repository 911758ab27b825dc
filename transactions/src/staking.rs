//! The five staking intents and their payloads.

use itc_types::{Address, BlsPublicKey, BlsSignature, Dec};
use serde::{Deserialize, Serialize};

/// Longest allowed validator name, identity, website and security contact.
pub const MAX_NAME_LENGTH: usize = 140;
pub const MAX_IDENTITY_LENGTH: usize = 140;
pub const MAX_WEBSITE_LENGTH: usize = 140;
pub const MAX_SECURITY_CONTACT_LENGTH: usize = 140;
/// Longest allowed free-form details.
pub const MAX_DETAILS_LENGTH: usize = 280;

/// Numeric tag the network uses to tell intents apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Directive {
    CreateValidator = 0,
    EditValidator = 1,
    Delegate = 2,
    Undelegate = 3,
    CollectRewards = 4,
}

/// Public validator metadata. Lengths are counted in bytes.
///
/// In an edit, an empty field leaves the current value unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub name: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRates {
    pub rate: Dec,
    pub max_rate: Dec,
    pub max_change_rate: Dec,
}

/// Requested eligibility change in an edit. `None` on the edit leaves it as is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EposStatus {
    Active,
    Inactive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateValidator {
    pub validator_address: Address,
    pub description: Description,
    pub commission_rates: CommissionRates,
    pub min_self_delegation: Dec,
    pub max_total_delegation: Dec,
    pub slot_pub_keys: Vec<BlsPublicKey>,
    /// One proof of possession per entry of `slot_pub_keys`, same order.
    pub slot_key_sigs: Vec<BlsSignature>,
    pub amount: Dec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditValidator {
    pub validator_address: Address,
    pub description: Description,
    pub commission_rate: Option<Dec>,
    pub min_self_delegation: Option<Dec>,
    pub max_total_delegation: Option<Dec>,
    pub slot_key_to_remove: Option<BlsPublicKey>,
    pub slot_key_to_add: Option<BlsPublicKey>,
    pub slot_key_to_add_sig: Option<BlsSignature>,
    pub epos_status: Option<EposStatus>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegate {
    pub delegator_address: Address,
    pub validator_address: Address,
    pub amount: Dec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Undelegate {
    pub delegator_address: Address,
    pub validator_address: Address,
    pub amount: Dec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectRewards {
    pub delegator_address: Address,
}

/// A staking operation, built once and consumed by the signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakingIntent {
    CreateValidator(CreateValidator),
    EditValidator(EditValidator),
    Delegate(Delegate),
    Undelegate(Undelegate),
    CollectRewards(CollectRewards),
}

impl StakingIntent {
    pub fn directive(&self) -> Directive {
        match self {
            Self::CreateValidator(_) => Directive::CreateValidator,
            Self::EditValidator(_) => Directive::EditValidator,
            Self::Delegate(_) => Directive::Delegate,
            Self::Undelegate(_) => Directive::Undelegate,
            Self::CollectRewards(_) => Directive::CollectRewards,
        }
    }

    /// The account that must sign this intent.
    pub fn sender(&self) -> Address {
        match self {
            Self::CreateValidator(p) => p.validator_address,
            Self::EditValidator(p) => p.validator_address,
            Self::Delegate(p) => p.delegator_address,
            Self::Undelegate(p) => p.delegator_address,
            Self::CollectRewards(p) => p.delegator_address,
        }
    }

    pub fn is_validator_creation(&self) -> bool {
        matches!(self, Self::CreateValidator(_))
    }
}
