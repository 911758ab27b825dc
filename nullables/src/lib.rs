//! Nullable collaborators for deterministic testing.
//!
//! The wallet core reaches the outside world through three traits: the node
//! transport, the transaction signer and the passphrase provider. This crate
//! provides test-friendly implementations that:
//! - Answer from a script instead of a node, terminal or device
//! - Record what they were asked, for assertions
//! - Never touch the network
//!
//! Usage: hand these to the wallet core in place of the real collaborators.

pub mod passphrase;
pub mod signer;
pub mod transport;

pub use passphrase::NullPassphrases;
pub use signer::NullHardwareSigner;
pub use transport::{NullTransport, RecordedCall};
