use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// Every failure a node operation can surface.
///
/// Each variant carries a human-readable message; the variant itself is the
/// only classification there is.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// The node could not be reached (DNS, refused connection, timeout).
    #[error("network error: {0}")]
    Network(String),
    /// The node answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The operation has no backing on this node revision. Permanent; never retry.
    #[error("{operation} is not implemented on this node ({endpoint} endpoint unavailable)")]
    Unavailable {
        operation: &'static str,
        endpoint: &'static str,
    },
    /// Required local state was missing or invalid; no request was sent.
    #[error("{0}")]
    Precondition(String),
    /// A 2xx body that could not be read as the expected JSON.
    #[error("invalid response from node: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn wallet_not_connected() -> Self {
        Self::Precondition("wallet not connected: connect or import a wallet first".to_owned())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// One call against the node: a path under the configured base URL.
#[derive(Clone, PartialEq)]
pub struct NodeRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    /// Human label used in fallback error messages, e.g. "send transaction".
    pub operation: &'static str,
    pub timeout: Option<Duration>,
    pub idempotency_key: Option<String>,
}

impl NodeRequest {
    pub fn get(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::Get, operation, path)
    }

    pub fn post(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(Method::Post, operation, path)
    }

    pub fn new(method: Method, operation: &'static str, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            operation,
            timeout: None,
            idempotency_key: None,
        }
    }

    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, ClientError> {
        let value = serde_json::to_value(body)
            .map_err(|err| ClientError::Precondition(format!("failed to encode request body: {err}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Message used when a rejection carries no `error` field.
    pub fn fallback_message(&self, status_text: &str) -> String {
        format!("Failed to {}: {}", self.operation, status_text)
    }
}

// Bodies can hold private keys, so only their presence is printed.
impl fmt::Debug for NodeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("operation", &self.operation)
            .field("has_body", &self.body.is_some())
            .field("timeout", &self.timeout)
            .field("idempotency_key", &self.idempotency_key)
            .finish()
    }
}

#[async_trait]
pub trait NodeTransport: Send + Sync {
    fn base_url(&self) -> &str;

    /// Perform the request and return the parsed JSON body of a 2xx response.
    async fn send(&self, request: NodeRequest) -> Result<Value, ClientError>;
}

/// Read a 2xx body into a record type.
///
/// A `null` member counts as absent, so the record's default applies, and
/// an empty (`null`) body reads as an empty object. Missing data is never a
/// decode failure; only a present value of the wrong type is.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    let value = match value {
        Value::Null => Value::Object(Map::new()),
        other => drop_nulls(other),
    };
    serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}

fn drop_nulls(value: Value) -> Value {
    match value {
        Value::Object(members) => Value::Object(
            members
                .into_iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(key, member)| (key, drop_nulls(member)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(drop_nulls).collect()),
        other => other,
    }
}

/// Pull the `error` field out of a rejection body, if it has one.
pub fn error_field(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}
