//! Transaction signers.

use std::path::Path;

use async_trait::async_trait;
use itc_crypto::AccountKey;
use itc_transactions::{SignedStakingTransaction, StakingTransaction};
use itc_types::{Address, ChainId};
use tracing::debug;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::keystore::read_key_file;
use crate::passphrase::PassphraseProvider;

/// Signs a staking transaction and reports which account signed it.
///
/// Implemented by the local vault signer and by hardware signers.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(
        &self,
        tx: StakingTransaction,
        chain: ChainId,
    ) -> Result<(SignedStakingTransaction, Address), WalletError>;
}

/// Signs with an account key held in memory.
pub struct LocalSigner {
    key: AccountKey,
}

impl LocalSigner {
    pub fn new(key: AccountKey) -> Self {
        Self { key }
    }

    /// Decrypt the account key from a vault file.
    pub fn from_key_file(path: &Path, passphrase: &str) -> Result<Self, WalletError> {
        Ok(Self::new(read_key_file(path, passphrase)?))
    }

    pub fn address(&self) -> Address {
        self.key.address()
    }
}

#[async_trait]
impl TransactionSigner for LocalSigner {
    async fn sign(
        &self,
        tx: StakingTransaction,
        chain: ChainId,
    ) -> Result<(SignedStakingTransaction, Address), WalletError> {
        let hash = tx.signing_hash(chain)?;
        let signature = self.key.sign_prehash(&hash)?;
        let signed = tx.into_signed(chain, signature)?;
        Ok((signed, self.key.address()))
    }
}

/// Pick the signer `config` asks for.
///
/// With `hardware_signer` set, the attached device is used and the key file is never
/// opened. Otherwise the account key is decrypted from `key_file`.
pub fn signer_from_config(
    config: &WalletConfig,
    hardware: Option<Box<dyn TransactionSigner>>,
    key_file: &Path,
    passphrases: &dyn PassphraseProvider,
) -> Result<Box<dyn TransactionSigner>, WalletError> {
    if config.hardware_signer {
        return hardware.ok_or_else(|| {
            WalletError::Config("hardware signer requested but no device is attached".into())
        });
    }
    let passphrase = passphrases.passphrase(&format!("key file {}", key_file.display()))?;
    let signer = LocalSigner::from_key_file(key_file, &passphrase)?;
    debug!(address = %signer.address(), "using local signer");
    Ok(Box::new(signer))
}

/// Sign `tx` and check the signer is the intent's declared sender.
pub async fn sign_checked(
    signer: &dyn TransactionSigner,
    tx: StakingTransaction,
    chain: ChainId,
) -> Result<SignedStakingTransaction, WalletError> {
    let expected = tx.intent.sender();
    let (signed, actual) = signer.sign(tx, chain).await?;
    if actual != expected {
        return Err(WalletError::SignerMismatch { expected, actual });
    }
    debug!(signer = %actual, "transaction signed");
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::write_key_file;
    use crate::passphrase::FixedPassphrase;
    use itc_crypto::VaultKdf;
    use itc_transactions::{CollectRewards, StakingIntent};

    /// Reports a fixed address without signing anything.
    struct Device(Address);

    #[async_trait]
    impl TransactionSigner for Device {
        async fn sign(
            &self,
            _tx: StakingTransaction,
            _chain: ChainId,
        ) -> Result<(SignedStakingTransaction, Address), WalletError> {
            Err(WalletError::Signing(format!("device {} is locked", self.0)))
        }
    }

    fn collect(delegator: Address) -> StakingTransaction {
        StakingTransaction {
            nonce: 0,
            gas_price: 1,
            gas_limit: 21_000,
            intent: StakingIntent::CollectRewards(CollectRewards {
                delegator_address: delegator,
            }),
        }
    }

    #[tokio::test]
    async fn local_signature_recovers_to_signer() {
        let signer = LocalSigner::new(AccountKey::generate());
        let signed = sign_checked(&signer, collect(signer.address()), ChainId::Testnet)
            .await
            .unwrap();
        assert_eq!(signed.sender().unwrap(), signer.address());
    }

    #[tokio::test]
    async fn local_signer_for_other_sender_rejected() {
        let signer = LocalSigner::new(AccountKey::generate());
        let other = Address::new([9; 20]);
        let err = sign_checked(&signer, collect(other), ChainId::Mainnet)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WalletError::SignerMismatch { expected, actual }
                if expected == other && actual == signer.address()
        ));
    }

    #[tokio::test]
    async fn hardware_flag_selects_device_without_opening_key_file() {
        let config = WalletConfig {
            hardware_signer: true,
            ..WalletConfig::default()
        };
        let device: Box<dyn TransactionSigner> = Box::new(Device(Address::new([3; 20])));
        let signer = signer_from_config(
            &config,
            Some(device),
            Path::new("/nonexistent/account.key"),
            &FixedPassphrase::default(),
        )
        .unwrap();
        let err = signer
            .sign(collect(Address::new([3; 20])), ChainId::Testnet)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Signing(msg) if msg.contains("locked")));
    }

    #[test]
    fn hardware_flag_without_device_is_config_error() {
        let config = WalletConfig {
            hardware_signer: true,
            ..WalletConfig::default()
        };
        let result = signer_from_config(
            &config,
            None,
            Path::new("/nonexistent/account.key"),
            &FixedPassphrase::default(),
        );
        assert!(matches!(result, Err(WalletError::Config(_))));
    }

    #[tokio::test]
    async fn local_signer_loaded_from_key_file_when_flag_unset() {
        let dir = tempfile::tempdir().unwrap();
        let key = AccountKey::generate();
        let address = key.address();
        let path = write_key_file(&key, "pw", &dir.path().join("account.key"), VaultKdf::Legacy)
            .unwrap();

        let device: Box<dyn TransactionSigner> = Box::new(Device(Address::new([3; 20])));
        let signer = signer_from_config(
            &WalletConfig::default(),
            Some(device),
            &path,
            &FixedPassphrase::new("pw"),
        )
        .unwrap();
        let signed = sign_checked(signer.as_ref(), collect(address), ChainId::Testnet)
            .await
            .unwrap();
        assert_eq!(signed.sender().unwrap(), address);
    }
}
