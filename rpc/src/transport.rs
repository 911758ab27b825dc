//! Request/response transport to a node endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::trace;

use crate::error::RpcError;

/// Sends one JSON-RPC call to one endpoint.
///
/// Implementations return the `result` member of the response and turn an `error`
/// member into [`RpcError::Node`]. A `null` result is returned as [`Value::Null`].
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(
        &self,
        method: &str,
        endpoint: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError>;
}

/// JSON-RPC 2.0 over HTTP(S).
#[derive(Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new() -> Result<Self, RpcError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RpcError::transport("-", format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(
        &self,
        method: &str,
        endpoint: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(%endpoint, method, id, "rpc request");

        let response = self
            .http
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::transport(endpoint, e))?;

        if !response.status().is_success() {
            return Err(RpcError::transport(
                endpoint,
                format!("node returned HTTP {}", response.status()),
            ));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| RpcError::invalid(method, format!("not JSON: {e}")))?;

        extract_result(endpoint, json)
    }
}

/// Pull `result` out of a JSON-RPC response, surfacing `error` as [`RpcError::Node`].
pub fn extract_result(endpoint: &str, mut response: Value) -> Result<Value, RpcError> {
    if let Some(err) = response.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(RpcError::Node {
            endpoint: endpoint.to_string(),
            message,
        });
    }
    Ok(response
        .get_mut("result")
        .map(Value::take)
        .unwrap_or(Value::Null))
}
