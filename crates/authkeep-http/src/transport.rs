//! [`Transport`] over a `reqwest` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument, trace};

use authkeep_core::{ApiRequest, ApiResponse, Method, NetworkError, Transport};

/// Sends [`ApiRequest`]s with `reqwest`.
///
/// The session applies its own per-call timeout; a client-level timeout set
/// here is an additional upper bound.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Create a transport with the default client.
    pub fn new() -> Result<Self, NetworkError> {
        Self::builder()
            .build()
            .map(Self::with_client)
            .map_err(|e| map_error(e, None))
    }

    /// Create a transport whose client gives up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, NetworkError> {
        Self::builder()
            .timeout(timeout)
            .build()
            .map(|client| Self {
                client,
                timeout: Some(timeout),
            })
            .map_err(|e| map_error(e, Some(timeout)))
    }

    /// Wrap an existing client.
    ///
    /// Its own timeout, if any, is not known here and is reported as 0ms.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    fn builder() -> reqwest::ClientBuilder {
        reqwest::Client::builder().user_agent(concat!("authkeep/", env!("CARGO_PKG_VERSION")))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, NetworkError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .headers(to_header_map(&request)?);

        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body).map_err(|e| NetworkError::Http {
                message: format!("cannot encode request body: {}", e),
            })?;
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(e, self.timeout))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_error(e, self.timeout))?;

        debug!(status, "response received");
        trace!(len = body.len(), "response body");

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn to_header_map(request: &ApiRequest) -> Result<HeaderMap, NetworkError> {
    let mut headers = HeaderMap::with_capacity(request.headers.len());
    for (name, value) in request.headers.iter() {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| NetworkError::Http {
            message: format!("invalid header name '{}': {}", name, e),
        })?;
        // The value may be a credential; keep it out of the message.
        let value = HeaderValue::from_str(value).map_err(|_| NetworkError::Http {
            message: format!("invalid value for header '{}'", name),
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// `timeout` is the client-level bound, reported when it fires.
fn map_error(err: reqwest::Error, timeout: Option<Duration>) -> NetworkError {
    if err.is_timeout() {
        let duration_ms = timeout.map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        NetworkError::Timeout { duration_ms }
    } else if err.is_connect() {
        NetworkError::Connection {
            message: err.to_string(),
        }
    } else {
        NetworkError::Http {
            message: err.to_string(),
        }
    }
}
