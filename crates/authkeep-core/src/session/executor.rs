//! Authenticated request execution with a single refresh-and-retry on 401.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::error::{ApiError, Error};
use crate::request::{
    APPLICATION_JSON, AUTHORIZATION, ApiRequest, ApiResponse, CONTENT_TYPE, Headers,
    RequestOptions, Retry,
};
use crate::tokens::AccessToken;

use super::AuthSession;

/// Where a call is in the retry protocol.
///
/// `RefreshingThenRetrying` is entered at most once per call; a 401 seen in
/// that phase is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Sending,
    RefreshingThenRetrying,
}

impl AuthSession {
    /// Execute an authenticated request and return its parsed JSON body.
    ///
    /// The stored access token, if any, is sent as a bearer credential. When
    /// the server answers 401 and `retry` is [`Retry::OnUnauthorized`], the
    /// session is refreshed and the request reissued exactly once. If the
    /// refresh fails, stored credentials are torn down and
    /// [`Error::SessionExpired`] is returned.
    ///
    /// This call may rotate or clear the stored tokens.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] if the transport fails or times out (not retried)
    /// - [`Error::Api`] for any other non-2xx answer, or a final 401
    /// - [`Error::SessionExpired`] if a 401 could not be recovered by refreshing
    pub async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
        retry: Retry,
    ) -> Result<Value, Error> {
        decode_body(self.execute_response(endpoint, options, retry).await?)
    }

    /// Execute a request and decode its body into `T`.
    ///
    /// A 2xx body that does not match `T` is reported as an [`ApiError`]
    /// carrying the response status.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        retry: Retry,
    ) -> Result<T, Error> {
        decode_body(self.execute_response(endpoint, options, retry).await?)
    }

    /// Run the retry protocol and return the final response, whatever its status.
    #[instrument(skip(self, options), fields(method = %options.method))]
    async fn execute_response(
        &self,
        endpoint: &str,
        options: RequestOptions,
        retry: Retry,
    ) -> Result<ApiResponse, Error> {
        let url = self.inner.config.base_url.join(endpoint)?;
        let mut token = self.inner.store.access_token().await;
        let mut phase = Phase::Sending;

        loop {
            let request = build_request(&url, &options, token.as_ref(), phase);
            debug!(?phase, authenticated = token.is_some(), "sending request");

            let response = match self.send(request).await {
                Ok(response) => response,
                Err(err) => {
                    error!(error = %err, "API request error");
                    return Err(err.into());
                }
            };

            if response.is_unauthorized()
                && phase == Phase::Sending
                && retry == Retry::OnUnauthorized
            {
                phase = Phase::RefreshingThenRetrying;
                token = Some(self.recover_from_unauthorized(token).await?);
                continue;
            }

            return Ok(response);
        }
    }

    /// Obtain the token to retry with after `rejected` drew a 401.
    async fn recover_from_unauthorized(
        &self,
        rejected: Option<AccessToken>,
    ) -> Result<AccessToken, Error> {
        // A concurrent call may already have rotated the token.
        if let Some(current) = self.inner.store.access_token().await
            && rejected.as_ref() != Some(&current)
        {
            debug!("access token was rotated concurrently; retrying with it");
            return Ok(current);
        }

        match self.refresh().await {
            Ok(token) => Ok(token),
            Err(err) => {
                warn!(error = %err, "session could not be refreshed; tearing down");
                self.teardown().await;
                Err(Error::SessionExpired(err))
            }
        }
    }
}

/// Merge default and caller headers for one attempt.
///
/// Caller headers win over the defaults. On the retry the fresh bearer token
/// is applied last so it reaches the server.
fn build_request(
    url: &str,
    options: &RequestOptions,
    token: Option<&AccessToken>,
    phase: Phase,
) -> ApiRequest {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE, APPLICATION_JSON);
    if let Some(token) = token {
        headers.insert(AUTHORIZATION, token.bearer());
    }
    headers.merge(&options.headers);
    if phase == Phase::RefreshingThenRetrying
        && let Some(token) = token
    {
        headers.insert(AUTHORIZATION, token.bearer());
    }

    ApiRequest {
        method: options.method,
        url: url.to_string(),
        headers,
        body: options.body.clone(),
    }
}

fn decode_body<T: DeserializeOwned>(response: ApiResponse) -> Result<T, Error> {
    if !response.is_success() {
        let err = ApiError::from_response(&response);
        debug!(status = err.status, message = %err.message, "API returned an error");
        return Err(err.into());
    }

    response
        .json_value()
        .and_then(serde_json::from_value)
        .map_err(|e| ApiError::new(response.status, format!("invalid response body: {}", e)).into())
}
