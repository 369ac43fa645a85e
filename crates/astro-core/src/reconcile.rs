//! History reconciler. Merges the remote channel listing with the local
//! conversation store into one display list.
//!
//! Ordering contract: last activity descending (entries without a usable
//! timestamp sort as the epoch), then message count descending, then channel
//! id ascending. At most one entry per channel id.

use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use astro_types::{
    history::{HistoryEntry, HistoryListing, RemoteChannel},
    message::{new_channel_id, Message},
};
use crate::ports::HistoryPort;
use crate::store::{ChatMap, ConversationStore};

/// Merge a remote listing with local conversations.
///
/// Remote entries go in first and keep their counts; they borrow message
/// bodies from the local store when it has them. Local conversations the
/// remote service does not know about fill the gaps. Within the remote
/// listing a repeated channel id replaces the earlier one.
pub fn merge(remote: &[RemoteChannel], local: &ChatMap) -> Vec<HistoryEntry> {
    let mut by_channel: BTreeMap<String, HistoryEntry> = BTreeMap::new();

    for channel in remote {
        let Some(id) = channel.chat_channel.as_deref().filter(|c| !c.is_empty()) else {
            continue;
        };
        let bodies = local.get(id).cloned().unwrap_or_default();
        let mut entry = HistoryEntry::from_messages(id, bodies);
        entry.total_messages = channel.message_count.unwrap_or(0) as usize;
        entry.word_count = channel.word_count.unwrap_or(0) as usize;
        by_channel.insert(id.to_string(), entry);
    }

    for (id, messages) in local {
        if id.is_empty() {
            continue;
        }
        by_channel
            .entry(id.clone())
            .or_insert_with(|| HistoryEntry::from_messages(id.clone(), messages.clone()));
    }

    finalize(by_channel.into_values().collect())
}

/// Sort by the ordering contract, then drop repeated channel ids.
pub fn finalize(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    sort_entries(&mut entries);
    dedup_by_channel(entries)
}

pub fn sort_entries(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| {
        b.last_activity()
            .cmp(&a.last_activity())
            .then_with(|| b.total_messages.cmp(&a.total_messages))
            .then_with(|| a.chat_channel.cmp(&b.chat_channel))
    });
}

/// Keep the first entry of every channel id.
pub fn dedup_by_channel(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.chat_channel.clone()))
        .collect()
}

/// Optimistic insert: `entry` replaces any entry with the same channel id.
pub fn upsert(mut entries: Vec<HistoryEntry>, entry: HistoryEntry) -> Vec<HistoryEntry> {
    entries.retain(|e| e.chat_channel != entry.chat_channel);
    entries.push(entry);
    finalize(entries)
}

pub fn remove(entries: &mut Vec<HistoryEntry>, channel: &str) {
    entries.retain(|e| e.chat_channel != channel);
}

/// Ties the local store to an optional remote history service.
#[derive(Clone)]
pub struct HistoryReconciler {
    store: ConversationStore,
    remote: Option<Rc<dyn HistoryPort>>,
}

impl HistoryReconciler {
    pub fn new(store: ConversationStore, remote: Option<Rc<dyn HistoryPort>>) -> Self {
        Self { store, remote }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Fetch the remote listing and merge it with local data. A failed fetch
    /// degrades to the local listing and reports the error alongside it.
    pub async fn refresh(&self) -> HistoryListing {
        let local = self.store.all_chats();

        let Some(remote) = &self.remote else {
            return HistoryListing {
                entries: merge(&[], &local),
                error: None,
            };
        };

        match remote.list_channels().await {
            Ok(listing) => HistoryListing {
                entries: merge(&listing, &local),
                error: None,
            },
            Err(e) => {
                log::warn!("Remote history unavailable, showing local chats: {}", e);
                HistoryListing {
                    entries: merge(&[], &local),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Delete one conversation remotely (best effort) and locally.
    /// Returns whether the local store held it.
    pub async fn delete_chat(&self, channel: &str) -> bool {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete_channel(channel).await {
                log::warn!("API deletion failed, continuing with local deletion: {}", e);
            }
        }
        self.store.delete(channel)
    }

    /// Clear every local conversation. The remote service is not touched.
    pub fn delete_all(&self) -> bool {
        self.store.clear_all()
    }

    /// Create a channel holding just the greeting and return its entry.
    pub fn start_new_chat(&self, bot_name: &str, greeting: &str) -> HistoryEntry {
        let channel = new_channel_id();
        let messages = vec![Message::greeting(greeting, bot_name)];
        self.store.save(&channel, &messages);
        HistoryEntry::from_messages(channel, messages)
    }

    /// Ask the remote service for a greeting; `None` on failure or silence.
    pub async fn greeting(&self, channel: &str, user_id: &str) -> Option<String> {
        let remote = self.remote.as_ref()?;
        match remote.greeting(channel, user_id).await {
            Ok(text) => text.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                log::warn!("Error loading greeting: {}", e);
                None
            }
        }
    }
}
