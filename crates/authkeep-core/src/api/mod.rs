//! Named endpoint operations built on [`AuthSession::execute`](crate::AuthSession::execute).
//!
//! Each call is a parameter-to-payload mapping. Login-style calls never take
//! the refresh path: a 401 from them means the submitted credentials were
//! wrong, not that the session expired.

mod auth;
mod profile;

pub use auth::{AuthApi, UserType};
pub use profile::{BasicInfo, Preferences, ProfileApi};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, InvalidInputError};

fn to_body<T: Serialize>(payload: &T) -> Result<Value, Error> {
    serde_json::to_value(payload).map_err(|e| {
        InvalidInputError::Other {
            message: format!("cannot encode request body: {}", e),
        }
        .into()
    })
}
