//! Staking intent validation.
//!
//! Rules run in a fixed order and the first violation is the one reported:
//!
//! 1. description field lengths
//! 2. delegation bounds and amount
//! 3. commission rates
//! 4. BLS slot keys and their proofs of possession
//!
//! Rules 1-3 are pure checks over the intent. Rule 4 needs the proofs, which callers
//! typically load from disk, so it is exposed separately as [`verify_slot_keys`].

use itc_crypto::{parse_bls_public_key, verify_proof_of_possession};
use itc_types::{BlsPublicKey, BlsSignature, Dec};

use crate::error::TransactionError;
use crate::staking::{
    Description, StakingIntent, MAX_DETAILS_LENGTH, MAX_IDENTITY_LENGTH, MAX_NAME_LENGTH,
    MAX_SECURITY_CONTACT_LENGTH, MAX_WEBSITE_LENGTH,
};

/// Run every rule against `intent`.
pub fn validate_intent(intent: &StakingIntent) -> Result<(), TransactionError> {
    validate_fields(intent)?;
    verify_slot_keys(intent)
}

/// Rules 1-3: lengths, delegation bounds, rates.
pub fn validate_fields(intent: &StakingIntent) -> Result<(), TransactionError> {
    match intent {
        StakingIntent::CreateValidator(p) => {
            ensure_length(&p.description)?;
            delegation_amount_sanity_check(
                Some(p.min_self_delegation),
                Some(p.max_total_delegation),
                Some(p.amount),
            )?;
            let rates = &p.commission_rates;
            rate_sanity_check(rates.rate, rates.max_rate, rates.max_change_rate)
        }
        StakingIntent::EditValidator(p) => {
            ensure_length(&p.description)?;
            delegation_amount_sanity_check(p.min_self_delegation, p.max_total_delegation, None)?;
            match p.commission_rate {
                Some(rate) => check_unit_range(rate, "rate"),
                None => Ok(()),
            }
        }
        StakingIntent::Delegate(p) => ensure_non_negative(p.amount),
        StakingIntent::Undelegate(p) => ensure_non_negative(p.amount),
        StakingIntent::CollectRewards(_) => Ok(()),
    }
}

/// Rule 4: every slot key must be a valid curve point, and every added key must come
/// with a proof of possession that verifies.
pub fn verify_slot_keys(intent: &StakingIntent) -> Result<(), TransactionError> {
    match intent {
        StakingIntent::CreateValidator(p) => {
            if p.slot_pub_keys.len() != p.slot_key_sigs.len() {
                return Err(TransactionError::Format(format!(
                    "{} bls keys but {} proofs of possession",
                    p.slot_pub_keys.len(),
                    p.slot_key_sigs.len()
                )));
            }
            for (key, sig) in p.slot_pub_keys.iter().zip(&p.slot_key_sigs) {
                verify_slot_key(key, sig)?;
            }
            Ok(())
        }
        StakingIntent::EditValidator(p) => {
            if let Some(key) = &p.slot_key_to_remove {
                parse_bls_public_key(key)?;
            }
            match (&p.slot_key_to_add, &p.slot_key_to_add_sig) {
                (Some(key), Some(sig)) => verify_slot_key(key, sig),
                (Some(key), None) => Err(TransactionError::Format(format!(
                    "no proof of possession for bls key {key}"
                ))),
                (None, Some(_)) => Err(TransactionError::Format(
                    "proof of possession given without a bls key to add".into(),
                )),
                (None, None) => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

fn verify_slot_key(key: &BlsPublicKey, sig: &BlsSignature) -> Result<(), TransactionError> {
    verify_proof_of_possession(key, sig)?;
    Ok(())
}

/// Reject any description field longer than the network allows. Never truncates.
pub fn ensure_length(d: &Description) -> Result<(), TransactionError> {
    let fields = [
        (&d.name, MAX_NAME_LENGTH, "name"),
        (&d.identity, MAX_IDENTITY_LENGTH, "identity"),
        (&d.website, MAX_WEBSITE_LENGTH, "website"),
        (&d.security_contact, MAX_SECURITY_CONTACT_LENGTH, "security-contact"),
        (&d.details, MAX_DETAILS_LENGTH, "details"),
    ];
    for (value, max, field) in fields {
        if value.len() > max {
            return Err(TransactionError::validation(format!(
                "exceeds maximum length of {max} characters for {field}"
            )));
        }
    }
    Ok(())
}

/// Check delegation bounds, and the amount against them when all three are known.
pub fn delegation_amount_sanity_check(
    min_self_delegation: Option<Dec>,
    max_total_delegation: Option<Dec>,
    amount: Option<Dec>,
) -> Result<(), TransactionError> {
    if min_self_delegation.is_some_and(|min| min < Dec::ONE) {
        return Err(TransactionError::validation(
            "min-self-delegation can not be less than 1 ITC",
        ));
    }
    if max_total_delegation.is_some_and(|max| max < Dec::ONE) {
        return Err(TransactionError::validation(
            "max-total-delegation can not be less than 1 ITC",
        ));
    }
    if let Some(amount) = amount {
        ensure_non_negative(amount)?;
    }
    if let (Some(min), Some(max)) = (min_self_delegation, max_total_delegation) {
        if max < min {
            return Err(TransactionError::validation(
                "max-total-delegation can not be less than min-self-delegation",
            ));
        }
        if let Some(amount) = amount {
            if amount < min {
                return Err(TransactionError::validation(
                    "amount can not be less than min-self-delegation",
                ));
            }
            if amount > max {
                return Err(TransactionError::validation(
                    "amount can not be greater than max-total-delegation",
                ));
            }
        }
    }
    Ok(())
}

/// Each rate within `[0, 1]`, `rate <= max_rate`, `max_change_rate <= max_rate`.
pub fn rate_sanity_check(
    rate: Dec,
    max_rate: Dec,
    max_change_rate: Dec,
) -> Result<(), TransactionError> {
    check_unit_range(rate, "rate")?;
    check_unit_range(max_rate, "max-commission-rate")?;
    check_unit_range(max_change_rate, "max-change-rate")?;

    if rate > max_rate {
        return Err(TransactionError::validation(
            "rate can not be greater than max-commission-rate",
        ));
    }
    if max_change_rate > max_rate {
        return Err(TransactionError::validation(
            "max-change-rate can not be greater than max-commission-rate",
        ));
    }
    Ok(())
}

fn check_unit_range(value: Dec, name: &str) -> Result<(), TransactionError> {
    if value < Dec::ZERO {
        return Err(TransactionError::validation(format!(
            "{name} can not be less than 0, must be between 0 and 1"
        )));
    }
    if value > Dec::ONE {
        return Err(TransactionError::validation(format!(
            "{name} can not be greater than 1, must be between 0 and 1"
        )));
    }
    Ok(())
}

fn ensure_non_negative(amount: Dec) -> Result<(), TransactionError> {
    if amount.is_negative() {
        return Err(TransactionError::validation("amount can not be negative"));
    }
    Ok(())
}

/// Reject a string value that is really a command-line flag swallowed as the value.
pub fn assert_option_string(input: &str) -> Result<(), TransactionError> {
    if input.starts_with('-') {
        return Err(TransactionError::validation("invalid or missing option"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staking::{CommissionRates, CreateValidator, EditValidator};
    use itc_crypto::BlsKeyPair;
    use itc_types::Address;

    fn dec(s: &str) -> Dec {
        s.parse().unwrap()
    }

    fn message(err: TransactionError) -> String {
        match err {
            TransactionError::Validation(msg) => msg,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn create_validator(key: &BlsKeyPair) -> CreateValidator {
        CreateValidator {
            validator_address: Address::new([9; 20]),
            description: Description {
                name: "alice".into(),
                ..Default::default()
            },
            commission_rates: CommissionRates {
                rate: dec("0.1"),
                max_rate: dec("0.9"),
                max_change_rate: dec("0.05"),
            },
            min_self_delegation: dec("10000"),
            max_total_delegation: dec("100000"),
            slot_pub_keys: vec![key.public_key()],
            slot_key_sigs: vec![key.proof_of_possession()],
            amount: dec("10000"),
        }
    }

    #[test]
    fn rate_above_max_rate_rejected() {
        let err = rate_sanity_check(dec("0.5"), dec("0.2"), dec("0.1")).unwrap_err();
        assert_eq!(message(err), "rate can not be greater than max-commission-rate");
    }

    #[test]
    fn change_rate_above_max_rate_rejected() {
        let err = rate_sanity_check(dec("0.1"), dec("0.2"), dec("0.3")).unwrap_err();
        assert_eq!(
            message(err),
            "max-change-rate can not be greater than max-commission-rate"
        );
    }

    #[test]
    fn rates_outside_unit_interval_rejected() {
        let err = rate_sanity_check(dec("-0.1"), dec("0.2"), dec("0.1")).unwrap_err();
        assert_eq!(message(err), "rate can not be less than 0, must be between 0 and 1");
        let err = rate_sanity_check(dec("0.1"), dec("1.5"), dec("0.1")).unwrap_err();
        assert_eq!(
            message(err),
            "max-commission-rate can not be greater than 1, must be between 0 and 1"
        );
        rate_sanity_check(Dec::ZERO, Dec::ONE, Dec::ONE).unwrap();
    }

    #[test]
    fn amount_checked_against_bounds() {
        let (min, max) = (Some(dec("5")), Some(dec("10")));
        let err = delegation_amount_sanity_check(min, max, Some(dec("3"))).unwrap_err();
        assert_eq!(message(err), "amount can not be less than min-self-delegation");
        let err = delegation_amount_sanity_check(min, max, Some(dec("12"))).unwrap_err();
        assert_eq!(message(err), "amount can not be greater than max-total-delegation");
        delegation_amount_sanity_check(min, max, Some(dec("7"))).unwrap();
    }

    #[test]
    fn bounds_below_one_itc_rejected() {
        let err = delegation_amount_sanity_check(Some(dec("0.5")), None, None).unwrap_err();
        assert_eq!(message(err), "min-self-delegation can not be less than 1 ITC");
        let err = delegation_amount_sanity_check(None, Some(dec("0.99")), None).unwrap_err();
        assert_eq!(message(err), "max-total-delegation can not be less than 1 ITC");
        let err =
            delegation_amount_sanity_check(Some(dec("10")), Some(dec("5")), None).unwrap_err();
        assert_eq!(
            message(err),
            "max-total-delegation can not be less than min-self-delegation"
        );
    }

    #[test]
    fn bounds_reported_before_negative_amount() {
        let (max, amount) = (Some(dec("10")), Some(dec("-1")));
        let err = delegation_amount_sanity_check(Some(dec("0.5")), max, amount).unwrap_err();
        assert_eq!(message(err), "min-self-delegation can not be less than 1 ITC");
        let err = delegation_amount_sanity_check(Some(dec("5")), max, amount).unwrap_err();
        assert_eq!(message(err), "amount can not be negative");
    }

    #[test]
    fn details_length_boundary() {
        let mut d = Description {
            details: "x".repeat(280),
            ..Default::default()
        };
        ensure_length(&d).unwrap();
        d.details.push('x');
        let err = ensure_length(&d).unwrap_err();
        assert_eq!(
            message(err),
            "exceeds maximum length of 280 characters for details"
        );
    }

    #[test]
    fn lengths_are_counted_in_bytes() {
        // 71 two-byte characters: 142 bytes
        let d = Description {
            name: "é".repeat(71),
            ..Default::default()
        };
        assert!(ensure_length(&d).is_err());
    }

    #[test]
    fn option_string_guard() {
        assert!(assert_option_string("--bls-pubkeys-dir").is_err());
        assert_option_string("").unwrap();
        assert_option_string("0xabc").unwrap();
    }

    #[test]
    fn description_checked_before_rates() {
        let key = BlsKeyPair::generate().unwrap();
        let mut payload = create_validator(&key);
        payload.description.website = "w".repeat(141);
        payload.commission_rates.rate = dec("2");
        let err = validate_intent(&StakingIntent::CreateValidator(payload)).unwrap_err();
        assert_eq!(
            message(err),
            "exceeds maximum length of 140 characters for website"
        );
    }

    #[test]
    fn bounds_checked_before_rates() {
        let key = BlsKeyPair::generate().unwrap();
        let mut payload = create_validator(&key);
        payload.amount = dec("1");
        payload.commission_rates.rate = dec("2");
        let err = validate_intent(&StakingIntent::CreateValidator(payload)).unwrap_err();
        assert_eq!(message(err), "amount can not be less than min-self-delegation");
    }

    #[test]
    fn create_validator_with_valid_proof_passes() {
        let key = BlsKeyPair::generate().unwrap();
        validate_intent(&StakingIntent::CreateValidator(create_validator(&key))).unwrap();
    }

    #[test]
    fn proof_for_other_key_is_format_error() {
        let key = BlsKeyPair::generate().unwrap();
        let other = BlsKeyPair::generate().unwrap();
        let mut payload = create_validator(&key);
        payload.slot_key_sigs = vec![other.proof_of_possession()];
        assert!(matches!(
            validate_intent(&StakingIntent::CreateValidator(payload)),
            Err(TransactionError::Format(_))
        ));
    }

    #[test]
    fn missing_proof_is_format_error() {
        let key = BlsKeyPair::generate().unwrap();
        let mut payload = create_validator(&key);
        payload.slot_key_sigs.clear();
        assert!(matches!(
            validate_intent(&StakingIntent::CreateValidator(payload)),
            Err(TransactionError::Format(_))
        ));
    }

    #[test]
    fn edit_validator_checks_only_present_fields() {
        let key = BlsKeyPair::generate().unwrap();
        let mut edit = EditValidator {
            validator_address: Address::new([9; 20]),
            description: Description::default(),
            commission_rate: Some(dec("0.2")),
            min_self_delegation: None,
            max_total_delegation: None,
            slot_key_to_remove: None,
            slot_key_to_add: Some(key.public_key()),
            slot_key_to_add_sig: Some(key.proof_of_possession()),
            epos_status: None,
        };
        validate_intent(&StakingIntent::EditValidator(edit.clone())).unwrap();

        edit.slot_key_to_add_sig = None;
        assert!(matches!(
            validate_intent(&StakingIntent::EditValidator(edit.clone())),
            Err(TransactionError::Format(_))
        ));

        edit.slot_key_to_add = None;
        edit.commission_rate = Some(dec("1.01"));
        let err = validate_intent(&StakingIntent::EditValidator(edit)).unwrap_err();
        assert_eq!(
            message(err),
            "rate can not be greater than 1, must be between 0 and 1"
        );
    }
}
