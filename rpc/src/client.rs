//! Typed node calls on top of an [`RpcTransport`].

use std::sync::Arc;

use itc_types::{Address, Dec, ShardId, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::RpcError;
use crate::methods;
use crate::sharding::{EndpointRewrites, ShardTopologyEntry};
use crate::transport::RpcTransport;

/// Which account nonce to ask the node for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonceQuery {
    /// Next nonce including pool transactions.
    Pending,
    /// Confirmed on-chain nonce.
    Latest,
}

impl NonceQuery {
    fn tag(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Latest => "latest",
        }
    }
}

/// A rejection the node recorded for a staking transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingErrorEntry {
    #[serde(rename = "tx-hash-id")]
    pub tx_hash: String,
    #[serde(rename = "error-message", default)]
    pub message: String,
    #[serde(rename = "directive-kind", default, skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
    #[serde(rename = "time-at-rejection", default, skip_serializing_if = "Option::is_none")]
    pub time_at_rejection: Option<i64>,
}

/// Client for the node methods the staking tools consume.
///
/// Every call names its endpoint, since shards are served from different URLs.
#[derive(Clone)]
pub struct NodeClient {
    transport: Arc<dyn RpcTransport>,
    rewrites: EndpointRewrites,
}

impl NodeClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self::with_rewrites(transport, EndpointRewrites::default())
    }

    pub fn with_rewrites(transport: Arc<dyn RpcTransport>, rewrites: EndpointRewrites) -> Self {
        Self {
            transport,
            rewrites,
        }
    }

    /// Balance of `address` in ITC.
    pub async fn balance(&self, endpoint: &str, address: &Address) -> Result<Dec, RpcError> {
        let result = self
            .transport
            .request(
                methods::GET_BALANCE,
                endpoint,
                vec![json!(address.to_hex()), json!("latest")],
            )
            .await?;
        let atto = parse_quantity(methods::GET_BALANCE, &result)?;
        Dec::from_atto(atto).map_err(|e| RpcError::invalid(methods::GET_BALANCE, e))
    }

    /// The shard served by `endpoint`.
    pub async fn shard_id(&self, endpoint: &str) -> Result<ShardId, RpcError> {
        let result = self
            .transport
            .request(methods::GET_SHARD_ID, endpoint, vec![])
            .await?;
        let id = parse_quantity(methods::GET_SHARD_ID, &result)?;
        ShardId::try_from(id).map_err(|e| RpcError::invalid(methods::GET_SHARD_ID, e))
    }

    /// The network's shards and their routes, local endpoints rewritten to public ones.
    pub async fn sharding_structure(
        &self,
        endpoint: &str,
    ) -> Result<Vec<ShardTopologyEntry>, RpcError> {
        let result = self
            .transport
            .request(methods::GET_SHARDING_STRUCTURE, endpoint, vec![])
            .await?;
        let mut entries: Vec<ShardTopologyEntry> = serde_json::from_value(result)
            .map_err(|e| RpcError::invalid(methods::GET_SHARDING_STRUCTURE, e))?;
        for entry in &mut entries {
            self.rewrites.apply(entry);
        }
        Ok(entries)
    }

    /// Submit a signed transaction. Returns the node's raw reply.
    pub async fn send_raw_staking_transaction(
        &self,
        endpoint: &str,
        raw_hex: &str,
    ) -> Result<Value, RpcError> {
        self.transport
            .request(
                methods::SEND_RAW_STAKING_TRANSACTION,
                endpoint,
                vec![json!(raw_hex)],
            )
            .await
    }

    /// The receipt for `hash`, or `None` while it is not yet included.
    pub async fn transaction_receipt(
        &self,
        endpoint: &str,
        hash: &TxHash,
    ) -> Result<Option<Value>, RpcError> {
        let result = self
            .transport
            .request(
                methods::GET_TRANSACTION_RECEIPT,
                endpoint,
                vec![json!(hash.to_string())],
            )
            .await?;
        Ok((!result.is_null()).then_some(result))
    }

    /// Rejections the node has recorded for `hash`.
    pub async fn staking_errors(
        &self,
        endpoint: &str,
        hash: &TxHash,
    ) -> Result<Vec<StakingErrorEntry>, RpcError> {
        let result = self
            .transport
            .request(methods::GET_CURRENT_STAKING_ERROR_SINK, endpoint, vec![])
            .await?;
        if result.is_null() {
            return Ok(Vec::new());
        }
        let entries: Vec<StakingErrorEntry> = serde_json::from_value(result)
            .map_err(|e| RpcError::invalid(methods::GET_CURRENT_STAKING_ERROR_SINK, e))?;
        let wanted = hash.to_string();
        Ok(entries
            .into_iter()
            .filter(|entry| entry.tx_hash.eq_ignore_ascii_case(&wanted))
            .collect())
    }

    pub async fn transaction_count(
        &self,
        endpoint: &str,
        address: &Address,
        which: NonceQuery,
    ) -> Result<u64, RpcError> {
        let result = self
            .transport
            .request(
                methods::GET_TRANSACTION_COUNT,
                endpoint,
                vec![json!(address.to_hex()), json!(which.tag())],
            )
            .await?;
        let count = parse_quantity(methods::GET_TRANSACTION_COUNT, &result)?;
        u64::try_from(count).map_err(|e| RpcError::invalid(methods::GET_TRANSACTION_COUNT, e))
    }
}

/// Accept a JSON number, a decimal string or a `0x` hex string.
fn parse_quantity(method: &str, value: &Value) -> Result<u128, RpcError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| RpcError::invalid(method, format!("not an unsigned integer: {n}"))),
        Value::String(s) => {
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some("") => Ok(0),
                Some(hex) => u128::from_str_radix(hex, 16),
                None => s.parse::<u128>(),
            };
            parsed.map_err(|e| RpcError::invalid(method, format!("`{s}`: {e}")))
        }
        other => Err(RpcError::invalid(method, format!("unexpected {other}"))),
    }
}
