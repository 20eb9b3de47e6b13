//! scalar adapters
//!
//! converters between wire json values and the representation an operation
//! expects for custom graphql scalars.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const BUILT_IN_SCALARS: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

/// scalar conversion errors
#[derive(Debug, thiserror::Error)]
pub enum ScalarError {
    #[error("no adapter registered for custom scalar `{0}`")]
    UnknownScalar(String),

    #[error("cannot convert `{scalar}` value: {message}")]
    Conversion { scalar: String, message: String },
}

impl ScalarError {
    /// conversion failure for `scalar`
    pub fn conversion(scalar: impl Into<String>, message: impl Into<String>) -> Self {
        ScalarError::Conversion {
            scalar: scalar.into(),
            message: message.into(),
        }
    }
}

/// adapter for a single custom scalar type
pub trait ScalarAdapter: Send + Sync {
    /// convert an in-memory value into its wire form
    fn encode(&self, value: Value) -> Result<Value, ScalarError>;

    /// convert a wire value into its in-memory form
    fn decode(&self, value: Value) -> Result<Value, ScalarError>;
}

/// location of a custom scalar inside a response `data` object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarField {
    /// json pointer relative to `data`, e.g. `/hero/birthDate`
    pub pointer: &'static str,
    /// graphql scalar type name
    pub scalar: &'static str,
}

/// set of adapters keyed by graphql scalar type name
#[derive(Clone, Default)]
pub struct ScalarTypeAdapters {
    adapters: HashMap<String, Arc<dyn ScalarAdapter>>,
}

impl ScalarTypeAdapters {
    /// empty adapter set; built-in scalars still pass through
    pub fn new() -> Self {
        Self::default()
    }

    /// register an adapter for `scalar`, replacing any previous one
    pub fn with_adapter(
        mut self,
        scalar: impl Into<String>,
        adapter: impl ScalarAdapter + 'static,
    ) -> Self {
        self.adapters.insert(scalar.into(), Arc::new(adapter));
        self
    }

    /// true if an adapter is registered for `scalar`
    pub fn contains(&self, scalar: &str) -> bool {
        self.adapters.contains_key(scalar)
    }

    /// encode a value of `scalar` for the wire
    ///
    /// built-in scalars pass through unless an adapter overrides them.
    pub fn encode(&self, scalar: &str, value: Value) -> Result<Value, ScalarError> {
        match self.lookup(scalar)? {
            Some(adapter) => adapter.encode(value),
            None => Ok(value),
        }
    }

    /// decode a wire value of `scalar`
    pub fn decode(&self, scalar: &str, value: Value) -> Result<Value, ScalarError> {
        match self.lookup(scalar)? {
            Some(adapter) => adapter.decode(value),
            None => Ok(value),
        }
    }

    fn lookup(&self, scalar: &str) -> Result<Option<&dyn ScalarAdapter>, ScalarError> {
        if let Some(adapter) = self.adapters.get(scalar) {
            return Ok(Some(adapter.as_ref()));
        }
        if BUILT_IN_SCALARS.contains(&scalar) {
            return Ok(None);
        }
        Err(ScalarError::UnknownScalar(scalar.to_string()))
    }
}

impl fmt::Debug for ScalarTypeAdapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.adapters.keys().collect();
        names.sort();
        f.debug_struct("ScalarTypeAdapters")
            .field("adapters", &names)
            .finish()
    }
}
