//! Account balances across shards.

use itc_rpc::{is_ip_endpoint, NodeClient};
use itc_types::{Address, Dec, ShardId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::WalletError;

/// The balance held on one shard, in ITC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShardBalance {
    pub shard_id: ShardId,
    pub amount: Dec,
}

/// Balances from every shard that answered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub balances: Vec<ShardBalance>,
    /// Shards asked.
    pub queried: usize,
    /// Shards that failed and were skipped.
    pub failed: Vec<ShardId>,
}

impl BalanceReport {
    /// Shards were asked but none answered. An empty report is otherwise "no shards".
    pub fn all_unreachable(&self) -> bool {
        self.queried > 0 && self.balances.is_empty()
    }

    pub fn total(&self) -> Option<Dec> {
        self.balances
            .iter()
            .try_fold(Dec::ZERO, |acc, b| acc.checked_add(b.amount))
    }
}

/// Query `address` on every shard of `node`'s topology, one shard at a time.
///
/// A shard that fails is logged and skipped. When `node` is an IP-literal endpoint
/// only that node is asked, and its errors propagate.
pub async fn balances_across_shards(
    client: &NodeClient,
    node: &str,
    address: &Address,
) -> Result<BalanceReport, WalletError> {
    if is_ip_endpoint(node) {
        let amount = client.balance(node, address).await?;
        let shard_id = client.shard_id(node).await?;
        return Ok(BalanceReport {
            balances: vec![ShardBalance { shard_id, amount }],
            queried: 1,
            failed: Vec::new(),
        });
    }

    let topology = client.sharding_structure(node).await?;
    let mut report = BalanceReport {
        queried: topology.len(),
        ..BalanceReport::default()
    };
    for shard in &topology {
        match client.balance(&shard.http, address).await {
            Ok(amount) => {
                debug!(shard_id = shard.shard_id, %amount, "shard balance");
                report.balances.push(ShardBalance {
                    shard_id: shard.shard_id,
                    amount,
                });
            }
            Err(e) => {
                warn!(shard_id = shard.shard_id, endpoint = %shard.http, error = %e, "skipping unreachable shard");
                report.failed.push(shard.shard_id);
            }
        }
    }

    if report.all_unreachable() {
        warn!(%address, shards = report.queried, "no shard answered the balance query");
    }
    Ok(report)
}
