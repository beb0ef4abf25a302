//! Shared-secret access gate.
//!
//! Two secrets guard the API: the API secret authorizes calling any
//! operation, the confirmation secret authorizes destructive mutations.
//! Both default to the same value but can be configured independently.

use std::fmt;

use tracing::warn;

use crate::error::AuthError;

/// A configured secret. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret, rejecting empty values.
    pub fn new(value: impl Into<String>) -> Result<Self, AuthError> {
        let value = value.into();
        if value.is_empty() {
            return Err(AuthError::InvalidSecret("secret must not be empty".to_string()));
        }
        Ok(Self(value))
    }

    /// Exact, byte-for-byte comparison against a presented token.
    ///
    /// Runs over the full length of both inputs regardless of where the first
    /// mismatch occurs.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected.iter().zip(presented).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Validates caller credentials before any document operation runs.
///
/// # Example
///
/// ```rust
/// use simstore_auth::AccessGate;
///
/// let gate = AccessGate::new("s3cret").unwrap();
/// assert!(gate.authorize(Some("s3cret")).is_ok());
/// assert!(gate.authorize(None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate {
    api_secret: Secret,
    confirm_secret: Secret,
}

impl AccessGate {
    /// Create a gate whose confirmation secret equals the API secret.
    pub fn new(api_secret: impl Into<String>) -> Result<Self, AuthError> {
        let api_secret = Secret::new(api_secret)?;
        Ok(Self { confirm_secret: api_secret.clone(), api_secret })
    }

    /// Use a separate secret for confirming destructive operations.
    pub fn with_confirm_secret(mut self, confirm_secret: impl Into<String>) -> Result<Self, AuthError> {
        self.confirm_secret = Secret::new(confirm_secret)?;
        Ok(self)
    }

    /// Whether the confirmation secret differs from the API secret.
    pub fn has_separate_confirm_secret(&self) -> bool {
        self.api_secret != self.confirm_secret
    }

    /// Check the primary API credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] when the credential is absent or
    /// does not match.
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), AuthError> {
        match credential {
            Some(token) if self.api_secret.matches(token) => Ok(()),
            Some(_) => {
                warn!("rejected request with mismatched credential");
                Err(AuthError::Unauthorized)
            }
            None => {
                warn!("rejected request without credential");
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Check the confirmation token of a destructive operation.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Forbidden`] when the token is absent or does not
    /// match the confirmation secret.
    pub fn confirm(&self, token: Option<&str>) -> Result<(), AuthError> {
        match token {
            Some(token) if self.confirm_secret.matches(token) => Ok(()),
            _ => {
                warn!("rejected destructive operation: confirmation token mismatch");
                Err(AuthError::Forbidden)
            }
        }
    }
}
