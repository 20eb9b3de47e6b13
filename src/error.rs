//! error types
//!
//! structured errors for request composition, response parsing, and the
//! transports underneath them.

use std::fmt;

use crate::graphql::GraphQlError;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// boxed cause carried by wrapping errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// error type for the request pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// building the wire request failed; nothing was sent
    #[error("{message}: {source}")]
    Serialization {
        message: String,
        #[source]
        source: BoxError,
    },

    /// turning a wire response into a typed response failed
    #[error("{message}: {source}")]
    Parse {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {status}")]
    HttpStatus {
        /// http status code
        status: u16,
        /// raw response body
        body: String,
    },

    /// failure reported by a non-http transport
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("interceptor chain exhausted without a terminal interceptor")]
    ChainExhausted,
}

impl Error {
    pub(crate) fn serialization(source: impl Into<BoxError>) -> Self {
        Error::Serialization {
            message: "failed to compose graphql network request".to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn parse(source: impl Into<BoxError>) -> Self {
        Error::Parse {
            message: "failed to parse graphql network response".to_string(),
            source: source.into(),
        }
    }

    /// network failure without an underlying cause
    pub fn network(message: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
            source: None,
        }
    }

    /// true if the error looks like an auth failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::HttpStatus { status: 401 | 403, .. })
    }

    /// true if the error came from the transport rather than this pipeline
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::Network { .. }
        )
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
