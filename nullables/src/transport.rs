//! Nullable node transport: scripted replies, recorded calls.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use itc_rpc::{RpcError, RpcTransport};
use serde_json::Value;

/// One request the transport received.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub endpoint: String,
    pub params: Vec<Value>,
}

/// A transport that answers from a script.
///
/// Replies are scripted per method, optionally narrowed to one endpoint. A scripted
/// sequence is consumed front to back and its last reply repeats. Unscripted
/// methods fail with a node error.
#[derive(Default)]
pub struct NullTransport {
    by_method: Mutex<HashMap<String, VecDeque<Value>>>,
    by_endpoint: Mutex<HashMap<(String, String), VecDeque<Value>>>,
    failing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `method` with `reply`.
    pub fn respond(&self, method: &str, reply: Value) -> &Self {
        self.respond_sequence(method, vec![reply])
    }

    /// Answer `method` with each reply in turn, repeating the last.
    pub fn respond_sequence(&self, method: &str, replies: Vec<Value>) -> &Self {
        lock(&self.by_method).insert(method.to_string(), replies.into());
        self
    }

    /// Answer `method` on `endpoint` only.
    pub fn respond_at(&self, method: &str, endpoint: &str, reply: Value) -> &Self {
        lock(&self.by_endpoint).insert(
            (method.to_string(), endpoint.to_string()),
            VecDeque::from([reply]),
        );
        self
    }

    /// Every call to `endpoint` fails as a transport error.
    pub fn fail_endpoint(&self, endpoint: &str) -> &Self {
        lock(&self.failing).insert(endpoint.to_string());
        self
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// How many times `method` was called.
    pub fn count(&self, method: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    fn next_reply(&self, method: &str, endpoint: &str) -> Option<Value> {
        let key = (method.to_string(), endpoint.to_string());
        if let Some(queue) = lock(&self.by_endpoint).get_mut(&key) {
            return pop_sticky(queue);
        }
        lock(&self.by_method).get_mut(method).and_then(pop_sticky)
    }
}

#[async_trait]
impl RpcTransport for NullTransport {
    async fn request(
        &self,
        method: &str,
        endpoint: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError> {
        lock(&self.calls).push(RecordedCall {
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            params,
        });

        if lock(&self.failing).contains(endpoint) {
            return Err(RpcError::transport(endpoint, "connection refused"));
        }
        self.next_reply(method, endpoint).ok_or_else(|| RpcError::Node {
            endpoint: endpoint.to_string(),
            message: format!("no scripted response for {method}"),
        })
    }
}

fn pop_sticky(queue: &mut VecDeque<Value>) -> Option<Value> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
