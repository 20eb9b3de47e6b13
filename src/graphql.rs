//! graphql types
//!
//! wire-level request/response payloads and the typed response produced by
//! parsing them.

use crate::body::ResponseBody;
use crate::context::ExecutionContext;
use serde::{Deserialize, Deserializer, Serialize};

/// transport-agnostic request payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub operation_name: String,
    pub operation_id: String,
    pub document: String,
    /// variables after scalar marshaling
    pub variables: serde_json::Map<String, serde_json::Value>,
}

/// raw response emitted by a transport
#[derive(Debug)]
pub struct GraphQlResponse {
    pub body: ResponseBody,
    /// context contributed by the transport (status, headers, ...)
    pub execution_context: ExecutionContext,
}

impl GraphQlResponse {
    /// response over `body` with an empty context
    pub fn new(body: ResponseBody) -> Self {
        Self {
            body,
            execution_context: ExecutionContext::new(),
        }
    }

    /// attach the transport's context
    pub fn with_execution_context(mut self, execution_context: ExecutionContext) -> Self {
        self.execution_context = execution_context;
        self
    }
}

/// typed graphql response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response<T> {
    /// response data or null if errors
    pub data: Option<T>,
    /// graphql errors array, empty when absent or null
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<GraphQlError>,
    /// optional extensions payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
    /// request context merged with the transport's context
    #[serde(skip)]
    pub execution_context: ExecutionContext,
}

impl<T> Response<T> {
    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// same response with its execution context replaced
    pub fn with_execution_context(mut self, execution_context: ExecutionContext) -> Self {
        self.execution_context = execution_context;
        self
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// graphql error entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default)]
    pub locations: Vec<GraphQlLocation>,
    /// response path
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// optional extensions payload
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

/// graphql error location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: i64,
    /// column number (1-based)
    pub column: i64,
}
