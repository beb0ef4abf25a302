//! Access gate errors.

use thiserror::Error;

/// Errors produced by the [`AccessGate`](crate::AccessGate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The API credential was missing or did not match the configured secret.
    #[error("Unauthorized")]
    Unauthorized,

    /// The confirmation token for a destructive operation was missing or wrong.
    #[error("Forbidden: confirmation token rejected")]
    Forbidden,

    /// A secret could not be configured.
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),
}
