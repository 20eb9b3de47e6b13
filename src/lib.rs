//! graphql request pipeline
//!
//! this crate provides the network stage of a typed graphql client: it
//! composes a wire request from an [`Operation`], executes it on a
//! [`NetworkTransport`], and parses every wire response back into a typed
//! [`Response`]. start with [`Client`] and [`ClientConfig`], or plug
//! [`NetworkRequestInterceptor`] into your own [`InterceptorChain`].
//!
//! ## quick start
//!
//! ```no_run
//! use graphql_pipeline::{Client, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("http://localhost:4000/graphql"))?;
//! let response = client
//!     .execute_raw("query GetHero { hero { name } }", None)
//!     .await?;
//! println!("{:?}", response.data);
//! # Ok(())
//! # }
//! ```
//!
//! ## streaming
//!
//! transports may emit several responses per request. [`Client::execute`]
//! returns them as a stream, and [`Client::watch_latest`] follows only the
//! newest of a stream of requests.

mod body;
mod client;
mod config;
mod context;
mod error;
mod graphql;
mod interceptor;
mod latest;
mod operation;
mod request;
mod scalar;
mod transport;

pub use body::ResponseBody;
pub use client::Client;
pub use config::ClientConfig;
pub use context::{ContextMergePolicy, ExecutionContext, HttpResponseInfo, RequestHeaders};
pub use error::{BoxError, Error, Result};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlRequest, GraphQlResponse, Response};
pub use interceptor::{
    compose_request, CompositionError, InterceptorChain, NetworkRequestInterceptor,
    RequestInterceptor, ResponseStream,
};
pub use operation::{parse_response, Operation, OperationVariables, RawOperation};
pub use request::OperationRequest;
pub use scalar::{ScalarAdapter, ScalarError, ScalarField, ScalarTypeAdapters};
pub use transport::{HttpNetworkTransport, NetworkTransport};
