//! Shard topology and endpoint resolution.

use std::collections::HashMap;
use std::net::IpAddr;

use itc_types::ShardId;
use serde::{Deserialize, Serialize};

/// The beacon shard, where all staking transactions are sent.
pub const BEACON_SHARD: ShardId = 0;

/// One shard's RPC routes, as returned by the sharding-structure query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTopologyEntry {
    #[serde(rename = "shardID")]
    pub shard_id: ShardId,
    pub http: String,
    pub ws: String,
}

/// Local-to-public endpoint substitution, applied to every topology entry.
///
/// A pure lookup table: unknown endpoints pass through untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointRewrites(HashMap<String, String>);

impl Default for EndpointRewrites {
    fn default() -> Self {
        let table = [
            ("http://127.0.0.1:9500", "https://testnet.intelchain.network"),
            ("http://127.0.0.1:9502", "https://testnet.s1.intelchain.network"),
            ("ws://127.0.0.1:9800", "wss://testnet.s0.intelchain.network/ws"),
            ("ws://127.0.0.1:9802", "wss://testnet.s1.intelchain.network/ws"),
        ];
        Self(
            table
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }
}

impl EndpointRewrites {
    /// An empty table.
    pub fn none() -> Self {
        Self(HashMap::new())
    }

    /// Add or replace entries.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        self.0.extend(entries);
    }

    pub fn rewrite(&self, endpoint: &str) -> String {
        self.0
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| endpoint.to_string())
    }

    pub fn apply(&self, entry: &mut ShardTopologyEntry) {
        entry.http = self.rewrite(&entry.http);
        entry.ws = self.rewrite(&entry.ws);
    }
}

/// Whether `node` names a host by IP literal (`http://1.2.3.4:9500`), which means
/// the caller addressed one specific node rather than a network.
pub fn is_ip_endpoint(node: &str) -> bool {
    let rest = node
        .strip_prefix("http://")
        .or_else(|| node.strip_prefix("https://"))
        .unwrap_or(node);
    let host = rest.split(':').next().unwrap_or(rest);
    let host = host.split('/').next().unwrap_or(host);
    host.parse::<IpAddr>().is_ok()
}

/// HTTP endpoint of `shard` in `topology`.
pub fn endpoint_for_shard(topology: &[ShardTopologyEntry], shard: ShardId) -> Option<&str> {
    topology
        .iter()
        .find(|entry| entry.shard_id == shard)
        .map(|entry| entry.http.as_str())
}
