//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    /// The request never produced a response (connect, timeout, HTTP status).
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The node answered with a JSON-RPC error object.
    #[error("node error from {endpoint}: {message}")]
    Node { endpoint: String, message: String },

    /// The node answered, but not with what the method promises.
    #[error("invalid {method} response: {reason}")]
    InvalidResponse { method: String, reason: String },
}

impl RpcError {
    pub fn transport(endpoint: &str, reason: impl std::fmt::Display) -> Self {
        Self::Transport {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(method: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidResponse {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }
}
