//! authkeep-core - Token lifecycle and authenticated request protocol.
//!
//! The crate keeps an access/refresh token pair in an injected
//! [`CredentialStore`], attaches the access token to outbound calls made
//! through an injected [`Transport`], and on a 401 refreshes the pair once
//! before retrying. An unrecoverable refresh tears the session down and
//! surfaces [`Error::SessionExpired`].
//!
//! Storage and transport backends live in sibling crates
//! (`authkeep-file`, `authkeep-http`); [`MemoryStore`] is provided here.

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod request;
mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use api::{AuthApi, BasicInfo, Preferences, ProfileApi, UserType};
pub use config::{Endpoints, SessionConfig};
pub use credentials::OtpCredentials;
pub use error::{ApiError, Error, InvalidInputError, NetworkError, RefreshError, StorageError};
pub use request::{ApiRequest, ApiResponse, Headers, Method, RequestOptions, Retry};
pub use session::AuthSession;
pub use store::{CredentialStore, MemoryStore, StoreKey};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
pub use traits::{KeyValueStore, Transport};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
