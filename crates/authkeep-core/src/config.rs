//! Session configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::ApiUrl;

/// Default bound on every network call, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Where the session talks to and how long it waits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub base_url: ApiUrl,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub endpoints: Endpoints,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl SessionConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            endpoints: Endpoints::default(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Bound applied to primary, refresh and logout calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Endpoint paths, relative to [`SessionConfig::base_url`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    pub refresh: String,
    pub logout: String,
    pub google_auth: String,
    pub send_otp: String,
    pub verify_otp: String,
    pub update_name: String,
    pub user_profile: String,
    pub check_user_exists: String,
    pub profile: String,
    pub update_basic_info: String,
    pub update_preferences: String,
    pub creator_profile: String,
    pub brand_profile: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            refresh: "/api/auth/refresh-token".to_string(),
            logout: "/api/auth/logout".to_string(),
            google_auth: "/api/auth/google".to_string(),
            send_otp: "/api/auth/send-otp".to_string(),
            verify_otp: "/api/auth/verify-otp".to_string(),
            update_name: "/api/auth/update-name".to_string(),
            user_profile: "/api/auth/profile".to_string(),
            check_user_exists: "/api/auth/check-user".to_string(),
            profile: "/api/profile".to_string(),
            update_basic_info: "/api/profile/basic-info".to_string(),
            update_preferences: "/api/profile/preferences".to_string(),
            creator_profile: "/api/profile/creator".to_string(),
            brand_profile: "/api/profile/brand".to_string(),
        }
    }
}
