//! Unsigned and signed staking transactions and their canonical encoding.

use itc_crypto::{keccak256, recover_address, EcdsaSignature};
use itc_types::{Address, ChainId, TxHash};
use serde::{Deserialize, Serialize};

use crate::error::TransactionError;
use crate::staking::StakingIntent;

/// Canonical binary encoding shared by payloads, signing hashes and raw transactions.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, TransactionError> {
    Ok(bincode::serialize(value)?)
}

/// A fully populated, not yet signed, staking transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingTransaction {
    pub nonce: u64,
    /// Gas price in atto.
    pub gas_price: u128,
    pub gas_limit: u64,
    pub intent: StakingIntent,
}

impl StakingTransaction {
    /// The directive and intent as they are priced for intrinsic gas.
    pub fn payload_bytes(intent: &StakingIntent) -> Result<Vec<u8>, TransactionError> {
        encode(&(intent.directive() as u8, intent))
    }

    /// Keccak-256 over the transaction fields and the chain id.
    pub fn signing_hash(&self, chain: ChainId) -> Result<[u8; 32], TransactionError> {
        let bytes = encode(&(
            self.intent.directive() as u8,
            &self.intent,
            self.nonce,
            self.gas_price,
            self.gas_limit,
            chain.id(),
        ))?;
        Ok(keccak256(&bytes))
    }

    /// Attach a signature made over [`Self::signing_hash`] for `chain`.
    pub fn into_signed(
        self,
        chain: ChainId,
        signature: EcdsaSignature,
    ) -> Result<SignedStakingTransaction, TransactionError> {
        let v = chain
            .id()
            .checked_mul(2)
            .and_then(|v| v.checked_add(35 + u64::from(signature.recovery_id)))
            .ok_or_else(|| {
                TransactionError::Signing(format!("chain id {} too large", chain.id()))
            })?;
        Ok(SignedStakingTransaction {
            tx: self,
            chain_id: chain.id(),
            v,
            r: signature.r,
            s: signature.s,
        })
    }
}

/// A signed staking transaction. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedStakingTransaction {
    tx: StakingTransaction,
    chain_id: u64,
    v: u64,
    r: [u8; 32],
    s: [u8; 32],
}

impl SignedStakingTransaction {
    pub fn transaction(&self) -> &StakingTransaction {
        &self.tx
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The `(r, s, recovery id)` signature, with the chain id folded out of `v`.
    pub fn signature(&self) -> Result<EcdsaSignature, TransactionError> {
        let recovery_id = self
            .v
            .checked_sub(self.chain_id.saturating_mul(2).saturating_add(35))
            .filter(|id| *id <= 1)
            .ok_or_else(|| TransactionError::Signing(format!("invalid v {}", self.v)))?;
        Ok(EcdsaSignature {
            r: self.r,
            s: self.s,
            recovery_id: recovery_id as u8,
        })
    }

    /// The address that produced the signature.
    pub fn sender(&self) -> Result<Address, TransactionError> {
        let hash = self.tx.signing_hash(ChainId::Custom(self.chain_id))?;
        Ok(recover_address(&hash, &self.signature()?)?)
    }

    pub fn encode(&self) -> Result<Vec<u8>, TransactionError> {
        encode(self)
    }

    /// `0x`-prefixed hex of the encoding, as submitted to the node.
    pub fn raw_hex(&self) -> Result<String, TransactionError> {
        Ok(format!("0x{}", hex::encode(self.encode()?)))
    }

    pub fn hash(&self) -> Result<TxHash, TransactionError> {
        Ok(TxHash::new(keccak256(&self.encode()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staking::CollectRewards;
    use itc_crypto::AccountKey;

    fn unsigned(sender: Address) -> StakingTransaction {
        StakingTransaction {
            nonce: 7,
            gas_price: 100_000_000_000,
            gas_limit: 21_000,
            intent: StakingIntent::CollectRewards(CollectRewards {
                delegator_address: sender,
            }),
        }
    }

    fn sign(key: &AccountKey, tx: StakingTransaction, chain: ChainId) -> SignedStakingTransaction {
        let hash = tx.signing_hash(chain).unwrap();
        let sig = key.sign_prehash(&hash).unwrap();
        tx.into_signed(chain, sig).unwrap()
    }

    #[test]
    fn signer_recovered_from_signed_transaction() {
        let key = AccountKey::generate();
        let signed = sign(&key, unsigned(key.address()), ChainId::Testnet);
        assert_eq!(signed.sender().unwrap(), key.address());
        assert_eq!(signed.chain_id(), 2);
    }

    #[test]
    fn signing_hash_depends_on_chain() {
        let tx = unsigned(Address::new([1; 20]));
        assert_ne!(
            tx.signing_hash(ChainId::Mainnet).unwrap(),
            tx.signing_hash(ChainId::Testnet).unwrap()
        );
    }

    #[test]
    fn raw_hex_decodes_back_to_the_transaction() {
        let key = AccountKey::generate();
        let signed = sign(&key, unsigned(key.address()), ChainId::Mainnet);
        let raw = signed.raw_hex().unwrap();
        assert!(raw.starts_with("0x"));
        let bytes = hex::decode(&raw[2..]).unwrap();
        let decoded: SignedStakingTransaction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.hash().unwrap(), signed.hash().unwrap());
    }

    #[test]
    fn nonce_changes_hash() {
        let key = AccountKey::generate();
        let a = sign(&key, unsigned(key.address()), ChainId::Mainnet);
        let mut tx = unsigned(key.address());
        tx.nonce += 1;
        let b = sign(&key, tx, ChainId::Mainnet);
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }
}
