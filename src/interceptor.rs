//! request interceptors
//!
//! the interceptor chain contract and the terminal network stage that turns a
//! typed request into wire traffic and back.

use crate::context::ContextMergePolicy;
use crate::error::{Error, Result};
use crate::graphql::{GraphQlRequest, GraphQlResponse, Response};
use crate::latest::SwitchLatest;
use crate::operation::Operation;
use crate::request::OperationRequest;
use crate::scalar::ScalarError;
use crate::transport::NetworkTransport;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use graphql_parser::query::{parse_query, Definition, OperationDefinition};
use std::sync::Arc;
use tracing::{debug, warn};

/// stream of typed responses produced by an interceptor
pub type ResponseStream<T> = BoxStream<'static, Result<Response<T>>>;

/// one link of the request pipeline
pub trait RequestInterceptor<O: Operation>: Send + Sync {
    /// handle `request`, optionally delegating to the rest of `chain`
    fn intercept(
        &self,
        request: OperationRequest<O>,
        chain: &InterceptorChain<O>,
    ) -> ResponseStream<O::Data>;
}

/// ordered interceptors, dispatched front to back
pub struct InterceptorChain<O: Operation> {
    interceptors: Arc<[Arc<dyn RequestInterceptor<O>>]>,
    index: usize,
}

impl<O: Operation> InterceptorChain<O> {
    /// chain starting at the first of `interceptors`
    pub fn new(interceptors: Vec<Arc<dyn RequestInterceptor<O>>>) -> Self {
        Self {
            interceptors: interceptors.into(),
            index: 0,
        }
    }

    /// pass `request` to the next interceptor
    pub fn proceed(&self, request: OperationRequest<O>) -> ResponseStream<O::Data> {
        match self.interceptors.get(self.index) {
            Some(interceptor) => {
                let next = Self {
                    interceptors: self.interceptors.clone(),
                    index: self.index + 1,
                };
                interceptor.intercept(request, &next)
            }
            None => stream::once(async { Err(Error::ChainExhausted) }).boxed(),
        }
    }
}

/// why a wire request could not be built
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("invalid query document: {0}")]
    InvalidDocument(String),

    #[error("operation `{0}` is not defined in the query document")]
    UnknownOperation(String),

    #[error("variables: {0}")]
    Variables(#[from] ScalarError),
}

/// terminal interceptor that executes requests on a [`NetworkTransport`]
#[derive(Clone)]
pub struct NetworkRequestInterceptor {
    transport: Arc<dyn NetworkTransport>,
    merge_policy: ContextMergePolicy,
}

impl NetworkRequestInterceptor {
    /// interceptor over `transport`
    pub fn new(transport: impl NetworkTransport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// interceptor over a shared transport
    pub fn from_arc(transport: Arc<dyn NetworkTransport>) -> Self {
        Self {
            transport,
            merge_policy: ContextMergePolicy::default(),
        }
    }

    /// set how request and transport context entries are combined
    pub fn with_merge_policy(mut self, merge_policy: ContextMergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    /// current context merge policy
    pub fn merge_policy(&self) -> ContextMergePolicy {
        self.merge_policy
    }

    /// execute a stream of requests for the same logical operation
    ///
    /// each new request supersedes the previous one: the earlier transport
    /// stream is dropped and its remaining responses are never delivered.
    pub fn intercept_latest<O, S>(&self, requests: S) -> ResponseStream<O::Data>
    where
        O: Operation,
        S: Stream<Item = OperationRequest<O>> + Send + 'static,
    {
        let this = self.clone();
        let calls = requests.map(move |request| this.execute(request)).boxed();
        SwitchLatest::new(calls).boxed()
    }

    fn execute<O: Operation>(&self, request: OperationRequest<O>) -> ResponseStream<O::Data> {
        let wire = match compose_request(&request) {
            Ok(wire) => wire,
            Err(err) => {
                warn!(
                    operation = %request.operation().name(),
                    error = %err,
                    "request composition failed"
                );
                return stream::once(async move { Err(err) }).boxed();
            }
        };

        debug!(
            operation = %wire.operation_name,
            operation_id = %wire.operation_id,
            "dispatching graphql request"
        );
        let policy = self.merge_policy;
        self.transport
            .execute(wire, request.execution_context().clone())
            .map(move |result| {
                result.and_then(|response| parse_response(&request, response, policy))
            })
            .boxed()
    }
}

impl<O: Operation> RequestInterceptor<O> for NetworkRequestInterceptor {
    fn intercept(
        &self,
        request: OperationRequest<O>,
        _chain: &InterceptorChain<O>,
    ) -> ResponseStream<O::Data> {
        self.intercept_latest(stream::once(async move { request }))
    }
}

impl std::fmt::Debug for NetworkRequestInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkRequestInterceptor")
            .field("merge_policy", &self.merge_policy)
            .finish()
    }
}

/// build the wire request for `request`
///
/// nothing is sent on failure; the error is an [`Error::Serialization`].
pub fn compose_request<O: Operation>(request: &OperationRequest<O>) -> Result<GraphQlRequest> {
    let operation = request.operation();
    let name = operation.name();
    let document = operation.query_document();

    check_document(document, name).map_err(Error::serialization)?;
    let variables = operation
        .variables()
        .marshal(request.scalar_adapters())
        .map_err(|err| Error::serialization(CompositionError::from(err)))?;

    Ok(GraphQlRequest {
        operation_name: name.to_string(),
        operation_id: operation.operation_id().to_string(),
        document: document.to_string(),
        variables,
    })
}

fn check_document(document: &str, name: &str) -> std::result::Result<(), CompositionError> {
    let parsed = parse_query::<&str>(document)
        .map_err(|err| CompositionError::InvalidDocument(err.to_string()))?;
    if name.is_empty() {
        return Ok(());
    }

    let defined = parsed.definitions.iter().any(|definition| match definition {
        Definition::Operation(OperationDefinition::Query(op)) => op.name == Some(name),
        Definition::Operation(OperationDefinition::Mutation(op)) => op.name == Some(name),
        Definition::Operation(OperationDefinition::Subscription(op)) => op.name == Some(name),
        _ => false,
    });
    if defined {
        Ok(())
    } else {
        Err(CompositionError::UnknownOperation(name.to_string()))
    }
}

fn parse_response<O: Operation>(
    request: &OperationRequest<O>,
    response: GraphQlResponse,
    policy: ContextMergePolicy,
) -> Result<Response<O::Data>> {
    let GraphQlResponse {
        mut body,
        execution_context,
    } = response;

    let parsed = request
        .operation()
        .parse(&mut body, request.scalar_adapters());
    body.close();

    match parsed {
        Ok(parsed) => Ok(parsed.with_execution_context(
            request.execution_context().merge(&execution_context, policy),
        )),
        Err(err) => {
            warn!(operation = %request.operation().name(), error = %err, "response parse failed");
            Err(Error::parse(err))
        }
    }
}
