use serde::{Deserialize, Serialize};

/// Who wrote a message.
///
/// The assistant is persisted as `"ai"`, which is what every stored
/// conversation already contains; `"assistant"` is accepted on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    #[serde(default)]
    pub text: String,
    /// RFC 3339 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: Some(now_rfc3339()),
            bot_name: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
            timestamp: Some(now_rfc3339()),
            bot_name: None,
        }
    }

    /// Opening message of a freshly started chat.
    pub fn greeting(text: impl Into<String>, bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: Some(bot_name.into()),
            ..Self::assistant(text)
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Whitespace-separated word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Per-channel statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStats {
    pub message_count: usize,
    pub word_count: usize,
    pub character_count: usize,
}

impl ChatStats {
    pub fn of(messages: &[Message]) -> Self {
        Self {
            message_count: messages.len(),
            word_count: messages.iter().map(Message::word_count).sum(),
            character_count: messages.iter().map(Message::char_count).sum(),
        }
    }
}

/// Current time as an RFC 3339 UTC string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fresh client-side channel identifier: `chat_<uuid-v4>`.
pub fn new_channel_id() -> String {
    format!("chat_{}", uuid::Uuid::new_v4())
}
