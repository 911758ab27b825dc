//! Cryptographic primitives for Intelchain staking.
//!
//! - **Vault cipher**: AES-256-GCM under a passphrase-derived key, in the legacy bare
//!   hex format or an Argon2id JSON envelope
//! - **BLS12-381** (min-pk) validator slot keys and proofs of possession
//! - **Keccak-256** for signing hashes and address derivation
//! - **secp256k1** account keys for transaction signing

pub mod account;
pub mod bls;
pub mod error;
pub mod hash;
pub mod vault;

pub use account::{recover_address, AccountKey, EcdsaSignature};
pub use bls::{
    parse_bls_public_key, verify_proof_of_possession, BlsKeyPair, BLS_VERIFICATION_MESSAGE,
};
pub use error::CryptoError;
pub use hash::keccak256;
pub use vault::{decrypt, encrypt, Argon2Params, EncryptedBlob, VaultKdf};
