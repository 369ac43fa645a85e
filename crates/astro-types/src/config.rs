use serde::{Deserialize, Serialize};

/// Client configuration, persisted under [`CONFIG_STORAGE_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Streaming relay endpoint (`POST`)
    pub relay_url: String,
    /// Remote history service base URL; empty disables remote sync
    pub api_url: String,
    /// Tenant tag forwarded to the RAG service
    pub admin: String,
    pub api_username: String,
    pub api_password: String,
    pub user_id: String,
    pub bot_name: String,
    pub use_context: bool,
    pub context_limit: u32,
    /// Shown in the error fallback message
    pub contact_url: String,
}

pub const CONFIG_STORAGE_KEY: &str = "astro:config";

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://localhost:3000/api/chat".to_string(),
            api_url: String::new(),
            admin: String::new(),
            api_username: String::new(),
            api_password: String::new(),
            user_id: "demo_user".to_string(),
            bot_name: "Astro Bot".to_string(),
            use_context: true,
            context_limit: 3,
            contact_url: "https://halfskirmish.com".to_string(),
        }
    }
}

impl ChatConfig {
    /// Basic-auth credentials, only when both halves are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.api_username.is_empty() || self.api_password.is_empty() {
            None
        } else {
            Some((self.api_username.as_str(), self.api_password.as_str()))
        }
    }

    pub fn has_remote_history(&self) -> bool {
        !self.api_url.trim().is_empty()
    }

    pub fn greeting_text(&self) -> String {
        format!(
            "Hey there! I'm {}. Ask me anything about the projects, skills and experience \
             I know about. What brings you here today?",
            self.bot_name
        )
    }

    pub fn error_text(&self) -> String {
        format!(
            "Sorry, I couldn't get a response. Please try again. If the issue persists, \
             get in touch through {}",
            self.contact_url
        )
    }
}

/// Shown when a stream ends without a single text fragment.
pub const NO_RESPONSE_TEXT: &str = "No response received.";

/// Placeholder shown while no channel is selected.
pub const WELCOME_TEXT: &str =
    "Welcome! Please start a new chat or select a chat from the history.";
