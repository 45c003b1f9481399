//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated API base URL.
///
/// Must use HTTPS, or HTTP for localhost only. Endpoints passed to the
/// session are resolved against it with [`ApiUrl::join`].
///
/// # Example
///
/// ```
/// use authkeep_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.example.com/").unwrap();
/// assert_eq!(api.join("/api/auth/profile").unwrap(),
///            "https://api.example.com/api/auth/profile");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::check(&url).map_err(|reason| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: reason.to_string(),
        })?;

        Ok(Self(url))
    }

    /// Resolve an endpoint against this base URL.
    ///
    /// Absolute `http(s)://` endpoints are returned as given, provided they
    /// meet the same scheme rules as the base URL. Anything else is treated
    /// as a path below the base URL.
    pub fn join(&self, endpoint: &str) -> Result<String, Error> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(InvalidInputError::Endpoint {
                value: endpoint.to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            let url = Url::parse(endpoint).map_err(|e| InvalidInputError::Endpoint {
                value: endpoint.to_string(),
                reason: e.to_string(),
            })?;
            Self::check(&url).map_err(|reason| InvalidInputError::Endpoint {
                value: endpoint.to_string(),
                reason: reason.to_string(),
            })?;
            return Ok(url.to_string());
        }

        // The URL crate always adds a trailing slash to root paths
        let base = self.0.as_str().trim_end_matches('/');
        Ok(format!("{}/{}", base, endpoint.trim_start_matches('/')))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// HTTPS, or HTTP for localhost only, with a host.
    fn check(url: &Url) -> Result<(), &'static str> {
        if url.cannot_be_a_base() {
            return Err("must be an absolute URL");
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err("must use HTTPS (HTTP allowed only for localhost)");
        }

        if url.host_str().is_none() {
            return Err("must have a host");
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert_eq!(api.host(), Some("api.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(api.host(), Some("127.0.0.1"));
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://api.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api/auth").is_err());
    }

    #[test]
    fn join_normalizes_slashes() {
        let api = ApiUrl::new("https://api.example.com/").unwrap();
        assert_eq!(
            api.join("/api/profile").unwrap(),
            "https://api.example.com/api/profile"
        );
        assert_eq!(
            api.join("api/profile").unwrap(),
            "https://api.example.com/api/profile"
        );
    }

    #[test]
    fn join_keeps_base_path() {
        let api = ApiUrl::new("https://api.example.com/v2/").unwrap();
        assert_eq!(
            api.join("/profile").unwrap(),
            "https://api.example.com/v2/profile"
        );
    }

    #[test]
    fn join_passes_absolute_endpoints_through() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert_eq!(
            api.join("https://other.example.com/x").unwrap(),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn join_rejects_plain_http_foreign_endpoint() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        let err = api.join("http://evil.example.com/steal").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput(InvalidInputError::Endpoint { .. })
        ));
    }

    #[test]
    fn join_allows_plain_http_to_localhost() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert_eq!(
            api.join("http://localhost:3000/x").unwrap(),
            "http://localhost:3000/x"
        );
    }

    #[test]
    fn join_rejects_empty_endpoint() {
        let api = ApiUrl::new("https://api.example.com").unwrap();
        assert!(api.join("  ").is_err());
    }

    #[test]
    fn deserializes_with_validation() {
        let api: ApiUrl = serde_json::from_str(r#""https://api.example.com""#).unwrap();
        assert_eq!(api.host(), Some("api.example.com"));
        assert!(serde_json::from_str::<ApiUrl>(r#""http://example.com""#).is_err());
    }
}
