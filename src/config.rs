//! client configuration
//!
//! build a [`ClientConfig`] with the graphql endpoint and optional overrides.
//! pass it to [`crate::Client::new`] or [`crate::HttpNetworkTransport::new`].

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// configuration for the http transport
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_url: String,

    /// graphql endpoint (e.g., "<https://api.example.com/graphql>")
    pub(crate) url: Option<Url>,

    /// request timeout duration
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// whether to verify ssl certificates
    pub(crate) verify_ssl: bool,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,

    /// send the operation id as a persisted query extension
    pub(crate) operation_id_extension: bool,

    /// prebuilt http client (takes precedence over http_client_builder)
    pub(crate) http_client: Option<reqwest::Client>,

    /// callback to customize the http client builder before building
    pub(crate) http_client_builder:
        Option<Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>>,
}

impl ClientConfig {
    /// create a new client configuration
    ///
    /// # arguments
    ///
    /// * `url` - the graphql endpoint; `https://` is assumed when no scheme is given
    ///
    /// # example
    ///
    /// ```
    /// use graphql_pipeline::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com/graphql");
    /// ```
    pub fn new(url: impl AsRef<str>) -> Self {
        let raw = url.as_ref();
        let url = Url::parse(raw)
            .or_else(|_| Url::parse(&format!("https://{}", raw)))
            .ok();

        Self {
            raw_url: raw.to_string(),
            url,
            timeout: Duration::from_secs(30),
            user_agent: format!("graphql-pipeline/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            extra_headers: HeaderMap::new(),
            operation_id_extension: false,
            http_client: None,
            http_client_builder: None,
        }
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// disable ssl certificate verification (not recommended for production)
    ///
    /// default: enabled
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// access extra headers configured on this client
    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    /// send `extensions.persistedQuery.sha256Hash` with the operation id
    ///
    /// default: disabled
    pub fn with_operation_id_extension(mut self, enabled: bool) -> Self {
        self.operation_id_extension = enabled;
        self
    }

    /// inject a prebuilt http client.
    ///
    /// when set, this client is used as-is and takes precedence over
    /// `with_http_client_builder`. tls, timeouts, ssl verification, user
    /// agent and default headers all come from the prebuilt client.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// customize the http client builder before the client is created.
    ///
    /// the callback receives a builder that already has the extra headers,
    /// user agent, timeout, and ssl settings applied.
    ///
    /// ignored if `with_http_client` is also set.
    pub fn with_http_client_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.http_client_builder = Some(Arc::new(f));
        self
    }

    /// validate the configuration and return the endpoint
    pub(crate) fn validate(&self) -> Result<&Url> {
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| Error::Config(format!("invalid graphql url: {}", self.raw_url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                url.scheme()
            )));
        }

        Ok(url)
    }

    /// build the http client described by this configuration
    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client> {
        if let Some(client) = &self.http_client {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(self.extra_headers.clone())
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .danger_accept_invalid_certs(!self.verify_ssl);
        if let Some(customize) = &self.http_client_builder {
            builder = customize(builder);
        }

        Ok(builder.build()?)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.raw_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("extra_headers", &self.extra_headers.len())
            .field("operation_id_extension", &self.operation_id_extension)
            .field("http_client", &self.http_client.is_some())
            .field("http_client_builder", &self.http_client_builder.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = ClientConfig::new("https://api.example.com/graphql");
        assert_eq!(
            config.validate().unwrap().as_str(),
            "https://api.example.com/graphql"
        );
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.operation_id_extension);
    }

    #[test]
    fn test_scheme_is_defaulted() {
        let config = ClientConfig::new("api.example.com/graphql");
        assert_eq!(
            config.validate().unwrap().as_str(),
            "https://api.example.com/graphql"
        );
    }

    #[test]
    fn test_validation_invalid_url() {
        let config = ClientConfig::new("");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validation_invalid_scheme() {
        let config = ClientConfig::new("ftp://example.com/graphql");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-test"),
            HeaderValue::from_static("value"),
        );

        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("pipeline-test")
            .with_ssl_verification(false)
            .with_operation_id_extension(true)
            .with_headers(headers.clone())
            .with_header(
                HeaderName::from_static("x-other"),
                HeaderValue::from_static("other"),
            );

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "pipeline-test");
        assert!(!config.verify_ssl);
        assert!(config.operation_id_extension);
        assert_eq!(config.extra_headers.get("x-test").unwrap(), "value");
        assert_eq!(config.extra_headers.get("x-other").unwrap(), "other");
        assert_eq!(config.extra_headers(), &config.extra_headers);
    }

    #[test]
    fn test_with_http_client() {
        let prebuilt = reqwest::Client::new();
        let config = ClientConfig::new("https://example.com/graphql").with_http_client(prebuilt);
        assert!(config.http_client.is_some());
        assert!(config.http_client_builder.is_none());
        assert!(config.build_http_client().is_ok());
    }

    #[test]
    fn test_with_http_client_builder() {
        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_http_client_builder(|b| b.connection_verbose(true));
        assert!(config.http_client.is_none());
        assert!(config.http_client_builder.is_some());
    }

    #[test]
    fn test_debug_hides_header_values() {
        let config = ClientConfig::new("https://api.example.com/graphql").with_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer secret"),
        );
        let debug = format!("{config:?}");
        assert!(debug.contains("http_client: false"));
        assert!(debug.contains("extra_headers: 1"));
        assert!(!debug.contains("secret"));
    }
}
