//! Local conversation store.
//!
//! All conversations live in a single storage record ([`HISTORY_KEY`]): a JSON
//! object mapping channel id to its ordered message array. Each save replaces
//! one channel's array wholesale; entries for other channels are carried over
//! untouched, even ones this version cannot parse.

use std::collections::BTreeMap;
use std::rc::Rc;
use serde_json::{Map, Value};
use astro_types::{
    ChatError, Result,
    history::HistoryEntry,
    message::{ChatStats, Message},
};
use crate::ports::StoragePort;
use crate::reconcile::sort_entries;

pub const HISTORY_KEY: &str = "chatHistory";

/// Channel id → messages, in channel id order.
pub type ChatMap = BTreeMap<String, Vec<Message>>;

#[derive(Clone)]
pub struct ConversationStore {
    storage: Rc<dyn StoragePort>,
}

impl ConversationStore {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    pub fn backend_name(&self) -> &str {
        self.storage.backend_name()
    }

    /// Replace the stored messages of `channel`. No-op for an empty channel
    /// id; write failures (e.g. quota exceeded) are logged, not returned.
    pub fn save(&self, channel: &str, messages: &[Message]) {
        if channel.is_empty() {
            return;
        }
        if let Err(e) = self.try_save(channel, messages) {
            log::error!("Error saving chat history: {}", e);
        }
    }

    fn try_save(&self, channel: &str, messages: &[Message]) -> Result<()> {
        let mut raw = self.read_raw()?;
        raw.insert(channel.to_string(), serde_json::to_value(messages)?);
        self.write_raw(&raw)
    }

    /// Messages of `channel`; empty if missing or unreadable.
    pub fn load(&self, channel: &str) -> Vec<Message> {
        if channel.is_empty() {
            return Vec::new();
        }
        let raw = match self.read_raw() {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Error loading chat history: {}", e);
                return Vec::new();
            }
        };
        match raw.get(channel) {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                log::error!("Error loading chat history for {}: {}", channel, e);
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    /// Whether `channel` has a stored entry, readable or not.
    pub fn contains(&self, channel: &str) -> bool {
        if channel.is_empty() {
            return false;
        }
        match self.read_raw() {
            Ok(raw) => raw.contains_key(channel),
            Err(e) => {
                log::error!("Error reading chat history: {}", e);
                false
            }
        }
    }

    /// Every readable conversation. Entries with an empty key or a value
    /// that is not a message array are skipped.
    pub fn all_chats(&self) -> ChatMap {
        let raw = match self.read_raw() {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Error getting all chats: {}", e);
                return ChatMap::new();
            }
        };

        raw.into_iter()
            .filter(|(channel, _)| !channel.is_empty())
            .filter_map(|(channel, value)| {
                match serde_json::from_value::<Vec<Message>>(value) {
                    Ok(messages) => Some((channel, messages)),
                    Err(e) => {
                        log::warn!("Skipping unreadable chat {}: {}", channel, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Remove `channel`. Returns whether anything was removed.
    pub fn delete(&self, channel: &str) -> bool {
        if channel.is_empty() {
            return false;
        }
        let result = self.read_raw().and_then(|mut raw| {
            if raw.remove(channel).is_some() {
                self.write_raw(&raw).map(|_| true)
            } else {
                Ok(false)
            }
        });
        result.unwrap_or_else(|e| {
            log::error!("Error deleting chat history: {}", e);
            false
        })
    }

    /// Reset the whole store to empty.
    pub fn clear_all(&self) -> bool {
        match self.storage.set(HISTORY_KEY, "{}") {
            Ok(()) => true,
            Err(e) => {
                log::error!("Error clearing all chats: {}", e);
                false
            }
        }
    }

    /// Move a conversation to a new channel id.
    pub fn rename(&self, from: &str, to: &str) -> bool {
        if from.is_empty() || to.is_empty() || from == to {
            return false;
        }
        let messages = self.load(from);
        self.save(to, &messages);
        self.delete(from)
    }

    pub fn stats(&self, channel: &str) -> ChatStats {
        ChatStats::of(&self.load(channel))
    }

    /// One entry per stored channel, most recent activity first.
    pub fn list_with_metadata(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .all_chats()
            .into_iter()
            .map(|(channel, messages)| HistoryEntry::from_messages(channel, messages))
            .collect();
        sort_entries(&mut entries);
        entries
    }

    /// Pretty JSON of one channel (`{channel: [...]}`) or of every channel.
    pub fn export(&self, channel: Option<&str>) -> String {
        let result = match channel {
            Some(channel) => {
                let mut one = ChatMap::new();
                one.insert(channel.to_string(), self.load(channel));
                serde_json::to_string_pretty(&one)
            }
            None => serde_json::to_string_pretty(&self.all_chats()),
        };
        result.unwrap_or_else(|e| {
            log::error!("Error exporting chat history: {}", e);
            "{}".to_string()
        })
    }

    /// Import an export. With `merge`, imported channels overwrite existing
    /// ones of the same id and everything else is kept; otherwise the store
    /// is replaced.
    pub fn import(&self, json: &str, merge: bool) -> bool {
        let result = parse_record(json).and_then(|imported| {
            let merged = if merge {
                let mut existing = self.read_raw().unwrap_or_default();
                existing.extend(imported);
                existing
            } else {
                imported
            };
            self.write_raw(&merged)
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("Error importing chat history: {}", e);
                false
            }
        }
    }

    fn read_raw(&self) -> Result<Map<String, Value>> {
        match self.storage.get(HISTORY_KEY)? {
            Some(text) => parse_record(&text),
            None => Ok(Map::new()),
        }
    }

    fn write_raw(&self, raw: &Map<String, Value>) -> Result<()> {
        let text = serde_json::to_string(raw)?;
        self.storage.set(HISTORY_KEY, &text)
    }
}

fn parse_record(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(ChatError::Serialization(format!(
            "expected an object of chats, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
