//! Astro relay: a small HTTP service between the chat client and one
//! upstream model provider.
//!
//! `POST /api/chat` validates the message, calls the configured provider
//! exactly once and streams its answer back. `GET /health` reports liveness.

pub mod config;
pub mod error;
pub mod logging;
pub mod provider;
pub mod routes;

pub use config::RelayConfig;
pub use error::RelayError;
pub use provider::Provider;
pub use routes::{create_router, AppState};

mod tests;
