use serde::{Deserialize, Serialize};
use crate::message::{ChatStats, Message};

/// One row of the history sidebar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub chat_channel: String,
    pub total_messages: usize,
    pub word_count: usize,
    #[serde(default)]
    pub character_count: usize,
    #[serde(default)]
    pub last_message: String,
    #[serde(default)]
    pub last_timestamp: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl HistoryEntry {
    /// Derive an entry from locally stored message bodies.
    pub fn from_messages(chat_channel: impl Into<String>, messages: Vec<Message>) -> Self {
        let stats = ChatStats::of(&messages);
        let last = messages.last();
        Self {
            chat_channel: chat_channel.into(),
            total_messages: stats.message_count,
            word_count: stats.word_count,
            character_count: stats.character_count,
            last_message: last.map(|m| m.text.clone()).unwrap_or_default(),
            last_timestamp: last.and_then(|m| m.timestamp.clone()),
            messages,
        }
    }

    /// Last activity in milliseconds since the epoch.
    /// Missing or unparsable timestamps count as the epoch itself.
    pub fn last_activity(&self) -> i64 {
        self.last_timestamp
            .as_deref()
            .and_then(|ts| chrono::DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or(0)
    }
}

/// A channel as listed by the remote history service (`GET /channels/list`).
/// Counts are authoritative; message bodies are never included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteChannel {
    #[serde(default)]
    pub chat_channel: Option<String>,
    #[serde(default)]
    pub message_count: Option<u64>,
    #[serde(default)]
    pub word_count: Option<u64>,
}

/// Output of a history refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryListing {
    pub entries: Vec<HistoryEntry>,
    /// Set when the remote listing could not be fetched and the
    /// entries come from local storage only.
    pub error: Option<String>,
}
