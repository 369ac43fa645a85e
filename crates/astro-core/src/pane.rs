//! Chat pane controller: one relay round-trip per submitted message.
//!
//! 1. Append the user message and persist the conversation
//! 2. Send it to the relay
//! 3. Read the response body chunk by chunk, decoding frames as they complete
//! 4. Grow a single assistant message, persisting after every fragment
//! 5. Fall back to fixed texts when nothing (or an error) comes back

use futures::StreamExt;
use astro_types::{
    Result,
    config::{ChatConfig, NO_RESPONSE_TEXT},
    event::ChatEvent,
    history::HistoryEntry,
    message::Message,
    relay::RelayRequest,
};
use crate::event_bus::EventBus;
use crate::frame::{Frame, FrameDecoder, FrameFormat};
use crate::ports::RelayPort;
use crate::reconcile::HistoryReconciler;
use crate::store::ConversationStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneState {
    Idle,
    /// Request sent, no fragment yet
    Waiting,
    Streaming,
    Error(String),
}

pub struct ChatPane {
    pub config: ChatConfig,
    pub channel: String,
    pub messages: Vec<Message>,
    pub state: PaneState,
    pub event_bus: EventBus,
    store: ConversationStore,
    bot_name: Option<String>,
    turn_counter: u64,
    /// Set once the channel disappears from the store during a turn
    detached: bool,
}

impl ChatPane {
    pub fn new(config: ChatConfig, store: ConversationStore, event_bus: EventBus) -> Self {
        Self {
            config,
            channel: String::new(),
            messages: Vec::new(),
            state: PaneState::Idle,
            event_bus,
            store,
            bot_name: None,
            turn_counter: 0,
            detached: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, PaneState::Waiting | PaneState::Streaming)
    }

    /// Switch to `channel`, loading its stored messages.
    pub fn load_channel(&mut self, channel: &str) {
        self.channel = channel.to_string();
        self.messages = self.store.load(channel);
        self.state = PaneState::Idle;
    }

    /// Open a fresh channel that holds only the greeting. Returns its
    /// history entry for the sidebar.
    pub fn new_chat(&mut self, history: &HistoryReconciler) -> HistoryEntry {
        let entry = history.start_new_chat(&self.config.bot_name, &self.config.greeting_text());
        self.load_channel(&entry.chat_channel);
        self.bot_name = None;
        entry
    }

    /// Forget the current channel (e.g. after it was deleted).
    pub fn reset(&mut self) {
        self.channel.clear();
        self.messages.clear();
        self.state = PaneState::Idle;
        self.bot_name = None;
    }

    /// Run one round-trip. Returns `false` without doing anything when the
    /// text is blank, a request is already in flight, or no channel is
    /// selected. Relay failures never escape: they become a fallback message.
    ///
    /// The text is stored and sent as typed; trimming only decides blankness.
    /// If the channel is deleted while the reply streams, the rest of the
    /// turn is shown but no longer saved.
    pub async fn submit(&mut self, text: &str, relay: &dyn RelayPort) -> bool {
        if text.trim().is_empty() || self.is_busy() || self.channel.is_empty() {
            return false;
        }

        self.turn_counter += 1;
        let turn_id = self.turn_counter;
        self.event_bus.emit(ChatEvent::TurnStart { turn_id });

        // The channel may exist only remotely, so this first save is unconditional.
        self.detached = false;
        let message = Message::user(text);
        self.messages.push(message.clone());
        self.store.save(&self.channel, &self.messages);
        self.event_bus.emit(ChatEvent::MessageAppended { message });
        self.state = PaneState::Waiting;

        let request = self.build_request(text);
        match self.relay_turn(request, relay).await {
            Ok(0) => {
                self.append(self.assistant_message(NO_RESPONSE_TEXT));
                self.state = PaneState::Idle;
            }
            Ok(_) => self.state = PaneState::Idle,
            Err(e) => {
                log::error!("Chat request failed: {}", e);
                self.append(self.assistant_message(&self.config.error_text()));
                self.state = PaneState::Error(e.to_string());
                self.event_bus.emit(ChatEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        self.event_bus.emit(ChatEvent::TurnEnd { turn_id });
        true
    }

    fn build_request(&self, text: &str) -> RelayRequest {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        RelayRequest {
            message: text.to_string(),
            chat_channel: Some(self.channel.clone()),
            admin: non_empty(&self.config.admin),
            user_id: non_empty(&self.config.user_id),
            use_context: Some(self.config.use_context),
            context_limit: Some(self.config.context_limit),
        }
    }

    /// Send and read the whole response. Returns the number of text
    /// fragments received.
    async fn relay_turn(&mut self, request: RelayRequest, relay: &dyn RelayPort) -> Result<usize> {
        let response = relay.send(request).await?;

        if let Some(channel) = response.channel.filter(|c| !c.is_empty() && *c != self.channel) {
            self.adopt_channel(channel);
        }

        let format = FrameFormat::from_content_type(response.content_type.as_deref());
        let mut decoder = FrameDecoder::new(format);
        let mut body = response.body;
        let mut fragments = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let frames = decoder.decode(&chunk);
            if self.apply_frames(frames, &mut fragments) {
                return Ok(fragments);
            }
        }

        let frames = decoder.finish();
        self.apply_frames(frames, &mut fragments);
        Ok(fragments)
    }

    /// Apply decoded frames; returns true once the stream signalled completion.
    fn apply_frames(&mut self, frames: Vec<Frame>, fragments: &mut usize) -> bool {
        for frame in frames {
            match frame {
                Frame::Text(text) => {
                    if *fragments == 0 {
                        let message = self.assistant_message("");
                        self.messages.push(message.clone());
                        self.event_bus.emit(ChatEvent::MessageAppended { message });
                        self.state = PaneState::Streaming;
                    }
                    *fragments += 1;

                    let full = match self.messages.last_mut() {
                        Some(last) => {
                            last.text.push_str(&text);
                            last.text.clone()
                        }
                        None => text,
                    };
                    self.persist();
                    self.event_bus.emit(ChatEvent::AssistantDelta { text: full });
                }
                Frame::Metadata { bot_name, admin_name } => {
                    log::info!("Bot metadata: {:?} {:?}", bot_name, admin_name);
                    if bot_name.is_some() {
                        self.bot_name = bot_name.clone();
                    }
                    self.event_bus.emit(ChatEvent::Metadata { bot_name, admin_name });
                }
                Frame::Done => return true,
            }
        }
        false
    }

    fn append(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.persist();
        self.event_bus.emit(ChatEvent::MessageAppended { message });
    }

    /// Save the conversation unless its channel was deleted mid-turn.
    fn persist(&mut self) {
        if self.detached {
            return;
        }
        if !self.store.contains(&self.channel) {
            log::warn!("Chat {} was deleted during the reply; not saving it again", self.channel);
            self.detached = true;
            return;
        }
        self.store.save(&self.channel, &self.messages);
    }

    fn assistant_message(&self, text: &str) -> Message {
        let mut message = Message::assistant(text);
        message.bot_name = self.bot_name.clone();
        message
    }

    fn adopt_channel(&mut self, channel: String) {
        log::info!("Relay resolved channel {} -> {}", self.channel, channel);
        if !self.detached && self.store.contains(&self.channel) {
            self.store.rename(&self.channel, &channel);
        }
        let previous = std::mem::replace(&mut self.channel, channel.clone());
        self.event_bus.emit(ChatEvent::ChannelResolved { previous, channel });
    }
}
