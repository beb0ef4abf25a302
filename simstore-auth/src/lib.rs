//! # simstore-auth
//!
//! Shared-secret access control for the simstore API.
//!
//! A single [`AccessGate`] checks the `Authorization` credential of every
//! request and, separately, the confirmation token that destructive
//! operations must carry.

mod error;
mod gate;

pub use error::AuthError;
pub use gate::{AccessGate, Secret};
