//! main client
//!
//! wires a transport into an interceptor chain ending in the network stage
//! and exposes helpers for typed, raw and streamed execution.

use crate::config::ClientConfig;
use crate::context::{ContextMergePolicy, ExecutionContext};
use crate::error::{Error, Result};
use crate::graphql::Response;
use crate::interceptor::{InterceptorChain, NetworkRequestInterceptor, ResponseStream};
use crate::operation::{Operation, OperationVariables, RawOperation};
use crate::request::OperationRequest;
use crate::scalar::ScalarTypeAdapters;
use crate::transport::{HttpNetworkTransport, NetworkTransport};
use futures_util::stream::{Stream, StreamExt};
use std::sync::Arc;

/// graphql client
#[derive(Clone)]
pub struct Client {
    network: NetworkRequestInterceptor,
    scalar_adapters: Arc<ScalarTypeAdapters>,
    execution_context: ExecutionContext,
}

impl Client {
    /// create a client that talks graphql over http
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpNetworkTransport::new(config)?))
    }

    /// create a client on top of any transport
    pub fn with_transport(transport: impl NetworkTransport + 'static) -> Self {
        Self {
            network: NetworkRequestInterceptor::new(transport),
            scalar_adapters: Arc::new(ScalarTypeAdapters::default()),
            execution_context: ExecutionContext::new(),
        }
    }

    /// adapters used for every request built by this client
    pub fn with_scalar_adapters(mut self, adapters: ScalarTypeAdapters) -> Self {
        self.scalar_adapters = Arc::new(adapters);
        self
    }

    /// context every request starts from
    pub fn with_execution_context(mut self, execution_context: ExecutionContext) -> Self {
        self.execution_context = execution_context;
        self
    }

    /// set how request and transport context entries are combined
    pub fn with_merge_policy(mut self, merge_policy: ContextMergePolicy) -> Self {
        self.network = self.network.with_merge_policy(merge_policy);
        self
    }

    /// build a request for `operation` with this client's adapters and context
    pub fn request<O: Operation>(&self, operation: O) -> OperationRequest<O> {
        OperationRequest::new(operation)
            .with_scalar_adapters(self.scalar_adapters.clone())
            .with_execution_context(self.execution_context.clone())
    }

    /// run a request through the interceptor chain
    pub fn execute<O: Operation>(&self, request: OperationRequest<O>) -> ResponseStream<O::Data> {
        let chain: InterceptorChain<O> =
            InterceptorChain::new(vec![Arc::new(self.network.clone())]);
        chain.proceed(request)
    }

    /// execute `operation` and wait for its first response
    pub async fn query<O: Operation>(&self, operation: O) -> Result<Response<O::Data>> {
        self.execute(self.request(operation))
            .next()
            .await
            .unwrap_or_else(|| Err(Error::network("transport completed without a response")))
    }

    /// execute a raw graphql query
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<Response<serde_json::Value>> {
        let variables = match variables {
            None => OperationVariables::default(),
            Some(serde_json::Value::Object(map)) => OperationVariables::from(map),
            Some(other) => {
                return Err(Error::serialization(format!(
                    "variables must be a json object, got {other}"
                )))
            }
        };
        self.query(RawOperation::new(query).with_variables(variables))
            .await
    }

    /// follow the latest of a stream of requests for one logical operation
    pub fn watch_latest<O, S>(&self, requests: S) -> ResponseStream<O::Data>
    where
        O: Operation,
        S: Stream<Item = OperationRequest<O>> + Send + 'static,
    {
        self.network.intercept_latest(requests)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("network", &self.network)
            .field("scalar_adapters", &self.scalar_adapters)
            .field("execution_context", &self.execution_context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::ResponseBody;
    use crate::graphql::{GraphQlRequest, GraphQlResponse};
    use futures_util::stream::{self, BoxStream};
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoTransport {
        seen: Mutex<Vec<GraphQlRequest>>,
    }

    impl NetworkTransport for EchoTransport {
        fn execute(
            &self,
            request: GraphQlRequest,
            _execution_context: ExecutionContext,
        ) -> BoxStream<'static, Result<GraphQlResponse>> {
            let body = serde_json::json!({ "data": { "variables": request.variables } });
            self.seen.lock().unwrap().push(request);
            stream::once(async move {
                Ok(GraphQlResponse::new(ResponseBody::from_bytes(body.to_string())))
            })
            .boxed()
        }
    }

    struct SilentTransport;

    impl NetworkTransport for SilentTransport {
        fn execute(
            &self,
            _request: GraphQlRequest,
            _execution_context: ExecutionContext,
        ) -> BoxStream<'static, Result<GraphQlResponse>> {
            stream::empty().boxed()
        }
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let err = Client::new(ClientConfig::new("ftp://example.com")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_raw_sends_variables() {
        let transport = Arc::new(EchoTransport::default());
        let client = Client::with_transport(transport.clone());
        let response = client
            .execute_raw(
                "query Q($id: ID) { node(id: $id) { id } }",
                Some(serde_json::json!({ "id": "n1" })),
            )
            .await
            .unwrap();

        assert_eq!(response.data.unwrap()["variables"]["id"], "n1");
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].document, "query Q($id: ID) { node(id: $id) { id } }");
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_execute_raw_rejects_non_object_variables() {
        let transport = Arc::new(EchoTransport::default());
        let client = Client::with_transport(transport.clone());
        let err = client
            .execute_raw("{ ok }", Some(serde_json::json!([1, 2])))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Serialization { .. }));
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_query_without_response() {
        let client = Client::with_transport(SilentTransport);
        let err = client.query(RawOperation::new("{ ok }")).await.unwrap_err();
        assert!(err.is_transport_error());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_client_context_flows_into_response() {
        #[derive(Debug, PartialEq)]
        struct Tenant(&'static str);

        let client = Client::with_transport(EchoTransport::default())
            .with_execution_context(ExecutionContext::new().with(Tenant("acme")));
        let response = client.query(RawOperation::new("{ ok }")).await.unwrap();
        assert_eq!(
            response.execution_context.get::<Tenant>(),
            Some(&Tenant("acme"))
        );
    }
}
