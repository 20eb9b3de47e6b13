//! operation contract
//!
//! trait implemented by generated query, mutation and subscription types,
//! plus the variable set they hand to the pipeline.

use crate::body::ResponseBody;
use crate::error::BoxError;
use crate::graphql::Response;
use crate::scalar::{ScalarError, ScalarField, ScalarTypeAdapters};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// graphql operation contract for generated types
pub trait Operation: Send + Sync + 'static {
    /// response payload type
    type Data: DeserializeOwned + Send + 'static;

    /// operation name as written in the document
    fn name(&self) -> &str;

    /// stable id of the operation document (e.g. a persisted query hash)
    fn operation_id(&self) -> &str;

    /// graphql query, mutation or subscription string
    fn query_document(&self) -> &str;

    /// variables sent with the document
    fn variables(&self) -> OperationVariables {
        OperationVariables::default()
    }

    /// custom scalars in the response that need decoding before `Data` is built
    fn response_scalars(&self) -> &[ScalarField] {
        &[]
    }

    /// read a response body into a typed response
    ///
    /// the default reads a standard graphql json response, decodes
    /// [`Operation::response_scalars`] with `adapters`, then deserializes `Data`.
    fn parse(
        &self,
        body: &mut ResponseBody,
        adapters: &ScalarTypeAdapters,
    ) -> Result<Response<Self::Data>, BoxError> {
        parse_response(body, self.response_scalars(), adapters)
    }
}

/// parse a graphql json response, decoding custom scalars along the way
pub fn parse_response<D: DeserializeOwned>(
    body: &mut ResponseBody,
    scalars: &[ScalarField],
    adapters: &ScalarTypeAdapters,
) -> Result<Response<D>, BoxError> {
    let mut raw: Response<Value> = serde_json::from_reader(&mut *body)?;

    if let Some(data) = raw.data.as_mut() {
        for field in scalars {
            if let Some(slot) = data.pointer_mut(field.pointer).filter(|v| !v.is_null()) {
                let wire = slot.take();
                *slot = adapters.decode(field.scalar, wire)?;
            }
        }
    }

    let data = raw.data.map(serde_json::from_value).transpose()?;
    Ok(Response {
        data,
        errors: raw.errors,
        extensions: raw.extensions,
        execution_context: raw.execution_context,
    })
}

#[derive(Debug, Clone, PartialEq)]
struct Variable {
    value: Value,
    scalar: Option<String>,
}

/// operation variables, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationVariables {
    values: BTreeMap<String, Variable>,
}

impl OperationVariables {
    /// empty variable set
    pub fn new() -> Self {
        Self::default()
    }

    /// plain variable, sent as-is
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(
            name.into(),
            Variable {
                value: value.into(),
                scalar: None,
            },
        );
        self
    }

    /// variable typed as `scalar`, encoded through its adapter on marshal
    pub fn with_scalar(
        mut self,
        name: impl Into<String>,
        scalar: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.values.insert(
            name.into(),
            Variable {
                value: value.into(),
                scalar: Some(scalar.into()),
            },
        );
        self
    }

    /// number of variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// true if no variables are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// encode every variable into its wire form
    pub fn marshal(
        &self,
        adapters: &ScalarTypeAdapters,
    ) -> Result<Map<String, Value>, ScalarError> {
        let mut out = Map::new();
        for (name, variable) in &self.values {
            let value = match &variable.scalar {
                Some(scalar) => adapters.encode(scalar, variable.value.clone())?,
                None => variable.value.clone(),
            };
            out.insert(name.clone(), value);
        }
        Ok(out)
    }
}

impl From<Map<String, Value>> for OperationVariables {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter()
            .fold(Self::new(), |vars, (name, value)| vars.with(name, value))
    }
}

/// ad-hoc operation built from a query string
#[derive(Debug, Clone)]
pub struct RawOperation {
    name: String,
    operation_id: String,
    query: String,
    variables: OperationVariables,
}

impl RawOperation {
    /// operation over `query` with no name, id or variables
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            operation_id: String::new(),
            query: query.into(),
            variables: OperationVariables::default(),
        }
    }

    /// set the operation name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// set the operation id
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = operation_id.into();
        self
    }

    /// replace the variables
    pub fn with_variables(mut self, variables: impl Into<OperationVariables>) -> Self {
        self.variables = variables.into();
        self
    }
}

impl Operation for RawOperation {
    type Data = Value;

    fn name(&self) -> &str {
        &self.name
    }

    fn operation_id(&self) -> &str {
        &self.operation_id
    }

    fn query_document(&self) -> &str {
        &self.query
    }

    fn variables(&self) -> OperationVariables {
        self.variables.clone()
    }
}
