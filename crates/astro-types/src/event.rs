use serde::{Deserialize, Serialize};
use crate::message::Message;

/// Events emitted by the chat pane.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A request to the relay is about to be sent
    TurnStart { turn_id: u64 },

    /// A complete message was appended to the conversation
    MessageAppended { message: Message },

    /// The in-progress assistant message grew; `text` is the full text so far
    AssistantDelta { text: String },

    /// The relay assigned a different channel id than the one we sent
    ChannelResolved { previous: String, channel: String },

    /// Bot metadata announced by an event-stream upstream
    Metadata { bot_name: Option<String>, admin_name: Option<String> },

    /// The round-trip finished (successfully or not)
    TurnEnd { turn_id: u64 },

    /// An error occurred; the fallback message has already been appended
    Error { message: String },
}
