//! Profile endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::error::Error;
use crate::request::{RequestOptions, Retry};
use crate::session::AuthSession;

use super::to_body;

/// Basic profile details collected during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfo {
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Date of birth as the server expects it (`YYYY-MM-DD`).
    pub dob: String,
    pub state: String,
    pub city: String,
    pub pincode: String,
}

/// Content preferences chosen during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub categories: Vec<String>,
    pub about: String,
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// ISO 8601 date or timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// Profile operations. Obtained from [`AuthSession::profile`].
#[derive(Debug, Clone, Copy)]
pub struct ProfileApi<'a> {
    session: &'a AuthSession,
}

impl<'a> ProfileApi<'a> {
    pub(crate) fn new(session: &'a AuthSession) -> Self {
        Self { session }
    }

    /// Fetch the full profile.
    pub async fn profile(&self) -> Result<Value, Error> {
        self.session
            .execute(
                &self.session.config().endpoints.profile,
                RequestOptions::get(),
                Retry::OnUnauthorized,
            )
            .await
    }

    #[instrument(skip(self, info))]
    pub async fn update_basic_info(&self, info: &BasicInfo) -> Result<Value, Error> {
        self.session
            .execute(
                &self.session.config().endpoints.update_basic_info,
                RequestOptions::post(to_body(info)?),
                Retry::OnUnauthorized,
            )
            .await
    }

    #[instrument(skip(self, preferences))]
    pub async fn update_preferences(&self, preferences: &Preferences) -> Result<Value, Error> {
        self.session
            .execute(
                &self.session.config().endpoints.update_preferences,
                RequestOptions::post(to_body(preferences)?),
                Retry::OnUnauthorized,
            )
            .await
    }

    /// Fetch the creator-specific profile.
    pub async fn creator_profile(&self) -> Result<Value, Error> {
        self.session
            .execute(
                &self.session.config().endpoints.creator_profile,
                RequestOptions::get(),
                Retry::OnUnauthorized,
            )
            .await
    }

    /// Fetch the brand-specific profile.
    pub async fn brand_profile(&self) -> Result<Value, Error> {
        self.session
            .execute(
                &self.session.config().endpoints.brand_profile,
                RequestOptions::get(),
                Retry::OnUnauthorized,
            )
            .await
    }
}
