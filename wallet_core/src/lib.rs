//! Staking wallet core for Intelchain.
//!
//! Provides what the staking commands need:
//! - Passphrase-encrypted key files, in the legacy or Argon2id vault format
//! - BLS slot keys bound to a chosen shard, and their proofs of possession
//! - Building, signing and submitting staking transactions, then waiting for receipts
//! - Account balances gathered from every shard
//!
//! All operations take a [`WalletConfig`] and their collaborators (node client,
//! signer, passphrase provider) explicitly.

pub mod balance;
pub mod bls_keys;
pub mod config;
pub mod error;
pub mod keygen;
pub mod keystore;
pub mod passphrase;
pub mod signer;
pub mod staking;
pub mod submit;

pub use balance::{balances_across_shards, BalanceReport, ShardBalance};
pub use bls_keys::{
    bls_proof, bls_proofs, bls_public_key_from_private, fill_slot_key_proofs, generate_bls_key,
    key_file_path, parse_bls_keys, recover_bls_key, save_bls_key,
};
pub use config::{NoncePolicy, PassphraseSource, VaultFormat, WalletConfig};
pub use error::WalletError;
pub use keygen::{
    find_key_for_shard, find_key_for_shard_with, generate_shard_keys, shard_for_bls_key,
    GeneratedKey, SearchBudget, ShardKeyAssignment,
};
pub use keystore::{default_key_path, read_key_file, write_key_file, KeyMaterial};
pub use passphrase::{
    FilePassphrase, FixedPassphrase, PassphraseProvider, PromptPassphrase, DEFAULT_PASSPHRASE,
};
pub use signer::{sign_checked, signer_from_config, LocalSigner, TransactionSigner};
pub use staking::{
    beacon_endpoint, prepare_staking_transaction, resolve_nonce, send_staking_transaction,
};
pub use submit::{await_confirmation, submit_and_confirm, ConfirmationPolicy, SubmissionOutcome};
