use async_trait::async_trait;
use bn_chain_client::{ClientError, Method, NodeRequest, NodeTransport, error_field};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::NodeConfig;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// reqwest-backed transport against a Binomena node.
///
/// No retries and no default timeout; a timeout applies only when the
/// request carries one.
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn presale_from_config(config: &NodeConfig) -> Self {
        Self::new(config.presale_url.clone())
    }
}

#[async_trait]
impl NodeTransport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: NodeRequest) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(key) = &request.idempotency_key {
            builder = builder.header(IDEMPOTENCY_KEY_HEADER, key);
        }

        debug!(method = %request.method, path = %request.path, operation = request.operation, "node request");

        let response = builder.send().await.map_err(|err| {
            warn!(
                method = %request.method,
                path = %request.path,
                operation = request.operation,
                "node unreachable: {}",
                err
            );
            ClientError::Network(describe(&err))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ClientError::Network(describe(&err)))?;

        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or(status.as_str());
            let message = error_field(&text).unwrap_or_else(|| request.fallback_message(status_text));
            warn!(
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                "node rejected request: {}",
                message
            );
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|err| ClientError::Decode(err.to_string()))
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request to node timed out".to_owned()
    } else if err.is_connect() {
        format!("could not connect to node: {err}")
    } else {
        err.to_string()
    }
}
