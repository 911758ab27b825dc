//! JSON-RPC client for Intelchain nodes.
//!
//! - [`RpcTransport`]: one `(method, endpoint, params)` call, with [`HttpTransport`]
//!   as the production implementation
//! - [`NodeClient`]: typed calls for balances, topology, submission, receipts,
//!   staking errors and nonces
//! - [`sharding`]: shard topology entries, endpoint rewrites and endpoint resolution

pub mod client;
pub mod error;
pub mod methods;
pub mod sharding;
pub mod transport;

pub use client::{NodeClient, NonceQuery, StakingErrorEntry};
pub use error::RpcError;
pub use sharding::{
    endpoint_for_shard, is_ip_endpoint, EndpointRewrites, ShardTopologyEntry, BEACON_SHARD,
};
pub use transport::{HttpTransport, RpcTransport};
