//! Login, OTP and account endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::credentials::OtpCredentials;
use crate::error::{Error, InvalidInputError};
use crate::request::{RequestOptions, Retry};
use crate::session::AuthSession;
use crate::tokens::TokenPair;

use super::to_body;

/// The kind of account being signed in or created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Creator,
    Brand,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Creator => "creator",
            UserType::Brand => "brand",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = InvalidInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "creator" => Ok(UserType::Creator),
            "brand" => Ok(UserType::Brand),
            _ => Err(InvalidInputError::Other {
                message: format!("unknown user type '{}'", s),
            }),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleAuthRequest<'a> {
    id_token: &'a str,
    is_signup: bool,
    user_type: UserType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpRequest<'a> {
    phone: &'a str,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    user_type: UserType,
}

#[derive(Serialize)]
struct PhoneRequest<'a> {
    phone: &'a str,
}

#[derive(Serialize)]
struct UpdateNameRequest<'a> {
    name: &'a str,
}

/// Login, OTP and account operations. Obtained from [`AuthSession::auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    session: &'a AuthSession,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(session: &'a AuthSession) -> Self {
        Self { session }
    }

    /// Sign in (or up) with a Google ID token.
    ///
    /// On success the returned token pair is stored and the `user` object,
    /// if present, is cached.
    #[instrument(skip(self, id_token))]
    pub async fn google_auth(
        &self,
        id_token: &str,
        is_signup: bool,
        user_type: UserType,
    ) -> Result<Value, Error> {
        let body = to_body(&GoogleAuthRequest {
            id_token,
            is_signup,
            user_type,
        })?;
        let response = self
            .post(&self.endpoints().google_auth, body, Retry::Never)
            .await?;
        self.complete_login(&response).await;
        Ok(response)
    }

    /// Ask the server to text a one-time code to `phone`.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, phone: &str) -> Result<Value, Error> {
        let body = to_body(&PhoneRequest { phone })?;
        self.post(&self.endpoints().send_otp, body, Retry::Never)
            .await
    }

    /// Exchange a one-time code for a session.
    ///
    /// `full_name` is only sent when creating an account.
    #[instrument(skip(self, credentials), fields(phone = credentials.phone()))]
    pub async fn verify_otp(
        &self,
        credentials: &OtpCredentials,
        full_name: Option<&str>,
        user_type: UserType,
    ) -> Result<Value, Error> {
        let body = to_body(&VerifyOtpRequest {
            phone: credentials.phone(),
            code: credentials.code(),
            full_name,
            user_type,
        })?;
        let response = self
            .post(&self.endpoints().verify_otp, body, Retry::Never)
            .await?;
        self.complete_login(&response).await;
        Ok(response)
    }

    /// Check whether an account exists for `phone`.
    #[instrument(skip(self))]
    pub async fn check_user_exists(&self, phone: &str) -> Result<Value, Error> {
        let body = to_body(&PhoneRequest { phone })?;
        self.post(&self.endpoints().check_user_exists, body, Retry::Never)
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_name(&self, name: &str) -> Result<Value, Error> {
        let body = to_body(&UpdateNameRequest { name })?;
        self.post(&self.endpoints().update_name, body, Retry::OnUnauthorized)
            .await
    }

    /// Fetch the signed-in user's account.
    pub async fn user_profile(&self) -> Result<Value, Error> {
        self.session
            .execute(
                &self.endpoints().user_profile,
                RequestOptions::get(),
                Retry::OnUnauthorized,
            )
            .await
    }

    /// Sign out: tear down the session and drop the cached user.
    pub async fn logout(&self) {
        self.session.teardown().await;
        self.session.store().clear_user_data().await;
    }

    /// Persist what a successful login response carries.
    ///
    /// Tokens are stored only as a complete pair.
    async fn complete_login(&self, response: &Value) {
        let store = self.session.store();
        let token = response.get("token").and_then(Value::as_str);
        let refresh = response.get("refreshToken").and_then(Value::as_str);

        match TokenPair::from_parts(token.map(str::to_owned), refresh.map(str::to_owned)) {
            Some(pair) => {
                store.set_tokens(&pair).await;
                info!("signed in");
            }
            None if token.is_some() || refresh.is_some() => {
                warn!("login response carried an incomplete token pair; not stored");
            }
            None => debug!("login response carried no tokens"),
        }

        if let Some(user) = response.get("user").filter(|u| u.is_object()) {
            store.set_user_data(user).await;
        }
    }

    async fn post(&self, endpoint: &str, body: Value, retry: Retry) -> Result<Value, Error> {
        self.session
            .execute(endpoint, RequestOptions::post(body), retry)
            .await
    }

    fn endpoints(&self) -> &'a crate::config::Endpoints {
        &self.session.config().endpoints
    }
}
