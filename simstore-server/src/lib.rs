//! `simstore-server` exposes the document indexer over HTTP.
//! Every document route is gated by the `Authorization` header; `/health` is open.

pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod settings;

pub use error::ApiError;
pub use server::{AppState, ServerConfig, app_router, run_server};
pub use settings::ServerSettings;
