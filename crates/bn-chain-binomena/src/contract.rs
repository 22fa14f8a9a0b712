use bn_chain_client::ClientError;
use serde_json::Value;
use std::collections::HashMap;

/// Positional argument kinds for a contract function.
///
/// Only JSON shape is checked; value bounds are left to the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Address,
    Amount,
    Integer,
    Bool,
    Text,
}

impl ArgKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Address => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            Self::Amount => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
            Self::Text => value.is_string(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Address => "a non-empty address string",
            Self::Amount => "a number",
            Self::Integer => "an integer",
            Self::Bool => "a boolean",
            Self::Text => "a string",
        }
    }
}

/// Argument schemas keyed by `(contract_id, function)`.
///
/// Functions with no registered schema are submitted unchecked.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<(String, String), Vec<ArgKind>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, contract_id: &str, function: &str, params: &[ArgKind]) {
        self.schemas.insert(
            (contract_id.to_owned(), function.to_owned()),
            params.to_vec(),
        );
    }

    pub fn with(mut self, contract_id: &str, function: &str, params: &[ArgKind]) -> Self {
        self.register(contract_id, function, params);
        self
    }

    pub fn schema(&self, contract_id: &str, function: &str) -> Option<&[ArgKind]> {
        self.schemas
            .get(&(contract_id.to_owned(), function.to_owned()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn validate(&self, contract_id: &str, function: &str, args: &[Value]) -> Result<(), ClientError> {
        let Some(params) = self.schema(contract_id, function) else {
            return Ok(());
        };

        if params.len() != args.len() {
            return Err(ClientError::Precondition(format!(
                "{contract_id}.{function} expects {} argument(s), got {}",
                params.len(),
                args.len()
            )));
        }

        for (position, (kind, arg)) in params.iter().zip(args).enumerate() {
            if !kind.accepts(arg) {
                return Err(ClientError::Precondition(format!(
                    "{contract_id}.{function} argument {position} must be {}, got {arg}",
                    kind.describe()
                )));
            }
        }

        Ok(())
    }
}
