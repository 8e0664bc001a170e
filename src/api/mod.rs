//! HTTP surface for report parsing.
//!
//! `api_router()` returns a composable `Router`; `server` binds it and
//! handles graceful shutdown.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession, ServerError};
pub use types::ApiContext;
