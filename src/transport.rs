//! network transports
//!
//! the [`NetworkTransport`] contract and an http implementation on reqwest.

use crate::body::ResponseBody;
use crate::config::ClientConfig;
use crate::context::{ExecutionContext, HttpResponseInfo, RequestHeaders};
use crate::error::{Error, Result};
use crate::graphql::{GraphQlRequest, GraphQlResponse};
use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const OPERATION_NAME_HEADER: HeaderName = HeaderName::from_static("x-apollo-operation-name");
const OPERATION_ID_HEADER: HeaderName = HeaderName::from_static("x-apollo-operation-id");

/// executes wire requests
///
/// a transport may emit several responses for one request (subscriptions,
/// multipart). dropping the returned stream must cancel any in-flight work.
pub trait NetworkTransport: Send + Sync {
    fn execute(
        &self,
        request: GraphQlRequest,
        execution_context: ExecutionContext,
    ) -> BoxStream<'static, Result<GraphQlResponse>>;
}

impl<T: NetworkTransport + ?Sized> NetworkTransport for Arc<T> {
    fn execute(
        &self,
        request: GraphQlRequest,
        execution_context: ExecutionContext,
    ) -> BoxStream<'static, Result<GraphQlResponse>> {
        (**self).execute(request, execution_context)
    }
}

/// graphql over http post
#[derive(Clone)]
pub struct HttpNetworkTransport {
    config: Arc<ClientConfig>,
    url: Url,
    http: reqwest::Client,
}

impl HttpNetworkTransport {
    /// create a new transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let url = config.validate()?.clone();
        let http = config.build_http_client()?;

        Ok(Self {
            config: Arc::new(config),
            url,
            http,
        })
    }

    /// access the transport configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn prepare(&self, request: &GraphQlRequest, context: &ExecutionContext) -> HttpExchange {
        let mut payload = serde_json::json!({
            "query": request.document,
            "variables": request.variables,
        });
        if !request.operation_name.is_empty() {
            payload["operationName"] = request.operation_name.clone().into();
        }
        if self.config.operation_id_extension && !request.operation_id.is_empty() {
            payload["extensions"] = serde_json::json!({
                "persistedQuery": { "version": 1, "sha256Hash": request.operation_id },
            });
        }

        let mut headers = HeaderMap::new();
        for (name, value) in [
            (OPERATION_NAME_HEADER, &request.operation_name),
            (OPERATION_ID_HEADER, &request.operation_id),
        ] {
            if value.is_empty() {
                continue;
            }
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(err) => warn!(header = %name, error = %err, "skipping invalid header value"),
            }
        }
        if let Some(RequestHeaders(extra)) = context.get::<RequestHeaders>() {
            headers.extend(extra.clone());
        }

        HttpExchange {
            url: self.url.clone(),
            headers,
            payload,
        }
    }
}

impl NetworkTransport for HttpNetworkTransport {
    fn execute(
        &self,
        request: GraphQlRequest,
        execution_context: ExecutionContext,
    ) -> BoxStream<'static, Result<GraphQlResponse>> {
        let exchange = self.prepare(&request, &execution_context);
        let http = self.http.clone();

        Box::pin(stream::once(async move {
            exchange
                .send_with(|url, headers, payload| async move {
                    let response = http.post(url).headers(headers).json(&payload).send().await?;
                    let status = response.status();
                    let headers = response.headers().clone();
                    let bytes = response.bytes().await?;
                    Ok((status, headers, bytes))
                })
                .await
        }))
    }
}

impl std::fmt::Debug for HttpNetworkTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNetworkTransport")
            .field("url", &self.url.as_str())
            .field("config", &self.config)
            .finish()
    }
}

/// one prepared http round trip
struct HttpExchange {
    url: Url,
    headers: HeaderMap,
    payload: serde_json::Value,
}

impl HttpExchange {
    async fn send_with<F, Fut>(self, send: F) -> Result<GraphQlResponse>
    where
        F: FnOnce(Url, HeaderMap, serde_json::Value) -> Fut,
        Fut: Future<Output = Result<(StatusCode, HeaderMap, Bytes)>>,
    {
        debug!(url = %self.url, "sending graphql http request");
        let (status, headers, bytes) = send(self.url, self.headers, self.payload).await?;
        debug!(status = status.as_u16(), len = bytes.len(), "graphql http response");

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let info = HttpResponseInfo {
            status: status.as_u16(),
            headers,
        };
        Ok(GraphQlResponse::new(ResponseBody::from_bytes(bytes))
            .with_execution_context(ExecutionContext::new().with(info)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn wire_request() -> GraphQlRequest {
        GraphQlRequest {
            operation_name: "GetHero".to_string(),
            operation_id: "abc123".to_string(),
            document: "query GetHero{hero{name}}".to_string(),
            variables: serde_json::Map::new(),
        }
    }

    fn transport(config: ClientConfig) -> HttpNetworkTransport {
        HttpNetworkTransport::new(config.with_http_client_builder(|b| b.no_proxy())).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = HttpNetworkTransport::new(ClientConfig::new("ftp://example.com")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_prepare_payload_and_headers() {
        let transport = transport(ClientConfig::new("http://localhost:1234/graphql"));
        let mut extra = HeaderMap::new();
        extra.insert("x-trace", HeaderValue::from_static("t-1"));
        let ctx = ExecutionContext::new().with(RequestHeaders(extra));

        let exchange = transport.prepare(&wire_request(), &ctx);
        assert_eq!(exchange.url.path(), "/graphql");
        assert_eq!(exchange.payload["operationName"], "GetHero");
        assert_eq!(exchange.payload["query"], "query GetHero{hero{name}}");
        assert_eq!(exchange.payload["variables"], serde_json::json!({}));
        assert!(exchange.payload.get("extensions").is_none());
        assert_eq!(exchange.headers.get("x-apollo-operation-name").unwrap(), "GetHero");
        assert_eq!(exchange.headers.get("x-apollo-operation-id").unwrap(), "abc123");
        assert_eq!(exchange.headers.get("x-trace").unwrap(), "t-1");
    }

    #[test]
    fn test_prepare_operation_id_extension() {
        let transport = transport(
            ClientConfig::new("http://localhost:1234/graphql").with_operation_id_extension(true),
        );
        let exchange = transport.prepare(&wire_request(), &ExecutionContext::new());
        assert_eq!(
            exchange.payload["extensions"]["persistedQuery"]["sha256Hash"],
            "abc123"
        );
    }

    #[test]
    fn test_prepare_anonymous_operation() {
        let transport = transport(ClientConfig::new("http://localhost:1234/graphql"));
        let mut request = wire_request();
        request.operation_name = String::new();
        request.operation_id = String::new();
        let exchange = transport.prepare(&request, &ExecutionContext::new());
        assert!(exchange.payload.get("operationName").is_none());
        assert!(exchange.headers.is_empty());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_send_success_contributes_context() {
        let transport = transport(ClientConfig::new("http://localhost:1234/graphql"));
        let exchange = transport.prepare(&wire_request(), &ExecutionContext::new());
        let mut response = exchange
            .send_with(|url, _headers, payload| async move {
                assert_eq!(url.path(), "/graphql");
                assert_eq!(payload["operationName"], "GetHero");
                let mut headers = HeaderMap::new();
                headers.insert("x-served-by", HeaderValue::from_static("edge-1"));
                Ok((StatusCode::OK, headers, Bytes::from_static(b"{\"data\":{}}")))
            })
            .await
            .unwrap();

        let info = response
            .execution_context
            .get::<HttpResponseInfo>()
            .unwrap();
        assert_eq!(info.status, 200);
        assert_eq!(info.headers.get("x-served-by").unwrap(), "edge-1");

        let mut text = String::new();
        response.body.read_to_string(&mut text).unwrap();
        assert_eq!(text, "{\"data\":{}}");
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_send_http_error() {
        let transport = transport(ClientConfig::new("http://localhost:1234/graphql"));
        let exchange = transport.prepare(&wire_request(), &ExecutionContext::new());
        let err = exchange
            .send_with(|_url, _headers, _payload| async move {
                Ok((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    HeaderMap::new(),
                    Bytes::from_static(b"oops"),
                ))
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::HttpStatus { status: 500, ref body } if body == "oops"
        ));
        assert!(err.is_transport_error());
    }
}
