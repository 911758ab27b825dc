//! Nullable hardware signer: signs in memory, can report a different account.

use async_trait::async_trait;
use itc_crypto::AccountKey;
use itc_transactions::{SignedStakingTransaction, StakingTransaction};
use itc_types::{Address, ChainId};
use itc_wallet_core::{TransactionSigner, WalletError};

/// Stands in for a hardware signing device.
///
/// Signs with an in-memory account key. [`Self::reporting`] makes the device claim a
/// different account than the one that signed, as a misconfigured device would.
pub struct NullHardwareSigner {
    key: AccountKey,
    reported: Option<Address>,
}

impl NullHardwareSigner {
    pub fn new(key: AccountKey) -> Self {
        Self {
            key,
            reported: None,
        }
    }

    pub fn reporting(mut self, address: Address) -> Self {
        self.reported = Some(address);
        self
    }

    /// The account the key actually signs for.
    pub fn address(&self) -> Address {
        self.key.address()
    }
}

#[async_trait]
impl TransactionSigner for NullHardwareSigner {
    async fn sign(
        &self,
        tx: StakingTransaction,
        chain: ChainId,
    ) -> Result<(SignedStakingTransaction, Address), WalletError> {
        let hash = tx.signing_hash(chain)?;
        let signature = self.key.sign_prehash(&hash)?;
        let signed = tx.into_signed(chain, signature)?;
        Ok((signed, self.reported.unwrap_or_else(|| self.key.address())))
    }
}
