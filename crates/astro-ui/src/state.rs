//! UI-level state that drives rendering.
//! This is a read-only projection of the chat pane and history reconciler,
//! updated each frame by draining the EventBus.

use astro_types::event::ChatEvent;
use astro_types::history::{HistoryEntry, HistoryListing};
use astro_types::message::{Message, Sender};
use astro_core::reconcile;
use astro_core::store::ConversationStore;

/// State visible to UI panels
pub struct UiState {
    /// Messages of the active channel, in display order
    pub messages: Vec<Message>,
    /// Active channel id; empty when nothing is selected
    pub channel: String,
    /// A request is in flight
    pub busy: bool,
    /// At least one fragment of the current reply has arrived
    pub streaming: bool,
    /// Input field content
    pub input_text: String,
    /// Status line text
    pub status_text: String,
    /// Bot name announced by the relay, if any
    pub bot_name: Option<String>,

    /// Sidebar entries, newest first, one per channel
    pub history: Vec<HistoryEntry>,
    /// Set when the last refresh fell back to local data
    pub history_error: Option<String>,
    pub history_loading: bool,
    /// Channel waiting for a delete confirmation
    pub confirm_delete: Option<String>,
    pub confirm_delete_all: bool,

    /// Whether the history sidebar is open
    pub show_history: bool,
    /// Whether settings panel is open
    pub show_settings: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            channel: String::new(),
            busy: false,
            streaming: false,
            input_text: String::new(),
            status_text: "Ready".to_string(),
            bot_name: None,
            history: Vec::new(),
            history_error: None,
            history_loading: false,
            confirm_delete: None,
            confirm_delete_all: false,
            show_history: true,
            show_settings: false,
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<ChatEvent>) {
        for event in events {
            match event {
                ChatEvent::TurnStart { .. } => {
                    self.busy = true;
                    self.streaming = false;
                    self.status_text = "Thinking...".to_string();
                }
                ChatEvent::MessageAppended { message } => {
                    self.messages.push(message);
                }
                ChatEvent::AssistantDelta { text } => {
                    self.streaming = true;
                    self.status_text = "Typing...".to_string();
                    match self.messages.last_mut() {
                        Some(last) if last.sender == Sender::Assistant => last.text = text,
                        _ => self.messages.push(Message::assistant(text)),
                    }
                }
                ChatEvent::ChannelResolved { previous, channel } => {
                    if self.channel == previous {
                        self.channel = channel.clone();
                    }
                    for entry in &mut self.history {
                        if entry.chat_channel == previous {
                            entry.chat_channel = channel.clone();
                        }
                    }
                    self.history = reconcile::dedup_by_channel(std::mem::take(&mut self.history));
                }
                ChatEvent::Metadata { bot_name, .. } => {
                    if bot_name.is_some() {
                        self.bot_name = bot_name;
                    }
                }
                ChatEvent::TurnEnd { .. } => {
                    self.busy = false;
                    self.streaming = false;
                    if !self.status_text.starts_with("Error") {
                        self.status_text = "Ready".to_string();
                    }
                }
                ChatEvent::Error { message } => {
                    self.status_text = format!("Error: {}", message);
                }
            }
        }
    }

    /// Show `channel` with its stored messages.
    pub fn show_channel(&mut self, channel: &str, messages: Vec<Message>) {
        self.channel = channel.to_string();
        self.messages = messages;
        self.streaming = false;
        self.bot_name = None;
        self.status_text = "Ready".to_string();
    }

    /// Back to the "nothing selected" welcome view.
    pub fn clear_channel(&mut self) {
        self.channel.clear();
        self.messages.clear();
        self.streaming = false;
        self.bot_name = None;
    }

    pub fn set_history(&mut self, listing: HistoryListing) {
        self.history = listing.entries;
        self.history_error = listing.error;
        self.history_loading = false;
    }

    /// Apply a drained batch, then refresh the active channel's sidebar entry
    /// from the store when a turn ended or the channel id changed. The
    /// refresh runs after the batch so it reads the resolved channel id.
    pub fn apply_events(&mut self, events: Vec<ChatEvent>, store: &ConversationStore) {
        let touched = events
            .iter()
            .any(|e| matches!(e, ChatEvent::TurnEnd { .. } | ChatEvent::ChannelResolved { .. }));
        self.process_events(events);
        if touched && !self.channel.is_empty() {
            let entry = HistoryEntry::from_messages(self.channel.clone(), store.load(&self.channel));
            self.upsert_history(entry);
        }
    }

    /// Optimistically insert or replace one sidebar entry.
    pub fn upsert_history(&mut self, entry: HistoryEntry) {
        self.history = reconcile::upsert(std::mem::take(&mut self.history), entry);
    }

    /// Drop a channel from the sidebar; clears the chat view when it was
    /// the active one.
    pub fn remove_history(&mut self, channel: &str) {
        reconcile::remove(&mut self.history, channel);
        if self.confirm_delete.as_deref() == Some(channel) {
            self.confirm_delete = None;
        }
        if self.channel == channel {
            self.clear_channel();
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.confirm_delete = None;
        self.confirm_delete_all = false;
        self.clear_channel();
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn can_send(&self) -> bool {
        !self.input_text.trim().is_empty() && !self.busy && !self.channel.is_empty()
    }

    /// Deleting waits for the reply in flight, which would otherwise save
    /// its channel again.
    pub fn can_delete(&self) -> bool {
        !self.busy
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
