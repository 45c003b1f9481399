//! One-time-password login credentials.

use std::fmt;

/// A phone number and the one-time code sent to it.
///
/// # Security
///
/// The code is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use authkeep_core::OtpCredentials;
///
/// let creds = OtpCredentials::new("+15550100", "123456");
/// assert_eq!(creds.phone(), "+15550100");
/// ```
#[derive(Clone)]
pub struct OtpCredentials {
    phone: String,
    code: String,
}

impl OtpCredentials {
    /// Create new credentials.
    pub fn new(phone: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            code: code.into(),
        }
    }

    /// Returns the phone number.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the one-time code.
    ///
    /// # Security
    ///
    /// Use this only when constructing the verification request.
    pub(crate) fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Debug for OtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpCredentials")
            .field("phone", &self.phone)
            .field("code", &"[REDACTED]")
            .finish()
    }
}
