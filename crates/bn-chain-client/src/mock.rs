//! Recording transport for tests.
//!
//! Replays canned responses keyed by `"METHOD path"` and records every
//! request it receives, so tests can assert what did (or did not) go out.

use crate::{ClientError, NodeRequest, NodeTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Result<Value, ClientError>>>,
    requests: Mutex<Vec<NodeRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, method: crate::Method, path: &str, response: Result<Value, ClientError>) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(format!("{method} {path}"), response);
        self
    }

    pub fn on_get(self, path: &str, body: Value) -> Self {
        self.respond(crate::Method::Get, path, Ok(body))
    }

    pub fn on_post(self, path: &str, body: Value) -> Self {
        self.respond(crate::Method::Post, path, Ok(body))
    }

    pub fn requests(&self) -> Vec<NodeRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl NodeTransport for MockTransport {
    fn base_url(&self) -> &str {
        "http://mock.node"
    }

    async fn send(&self, request: NodeRequest) -> Result<Value, ClientError> {
        let key = format!("{} {}", request.method, request.path);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);

        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
            .unwrap_or_else(|| {
                Err(ClientError::Rejected {
                    status: 404,
                    message: format!("no mock response for {key}"),
                })
            })
    }
}
