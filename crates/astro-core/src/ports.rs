//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `astro-core` (pure Rust).
//! Implementations live in `astro-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use astro_types::{
    Result,
    history::RemoteChannel,
    relay::RelayRequest,
};

// ─── Storage Port ────────────────────────────────────────────

/// Synchronous string key-value store (browser `localStorage` semantics).
pub trait StoragePort {
    /// Get a value by key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Relay Port ──────────────────────────────────────────────

/// Response body as it arrives, one read at a time.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>>>>;

/// A successful (2xx) relay response whose body has not been read yet.
pub struct RelayResponse {
    pub content_type: Option<String>,
    /// Channel id resolved by the relay, if it sent one
    pub channel: Option<String>,
    pub body: ByteStream,
}

#[async_trait(?Send)]
pub trait RelayPort {
    /// Send one user message. Non-success statuses come back as
    /// `ChatError::Status`.
    async fn send(&self, req: RelayRequest) -> Result<RelayResponse>;
}

// ─── History Port ────────────────────────────────────────────

/// Remote conversation history service.
#[async_trait(?Send)]
pub trait HistoryPort {
    /// `GET /channels/list`
    async fn list_channels(&self) -> Result<Vec<RemoteChannel>>;

    /// `DELETE /channels/delete?client_id=<channel>`
    async fn delete_channel(&self, channel: &str) -> Result<()>;

    /// `POST /chat/greeting`; `None` when the service has nothing to say
    async fn greeting(&self, channel: &str, user_id: &str) -> Result<Option<String>>;
}
