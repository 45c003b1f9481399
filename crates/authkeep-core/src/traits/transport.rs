//! Network transport trait.

use async_trait::async_trait;

use crate::error::NetworkError;
use crate::request::{ApiRequest, ApiResponse};

/// Sends a resolved request and returns the raw response.
///
/// Any HTTP status is a successful transport outcome; only failures to
/// complete the exchange are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, NetworkError>;
}
