//! Remote conversation history service.
//!
//! Endpoints (relative to the configured API base URL):
//! - `GET    /channels/list`                  → `[{chat_channel, message_count, word_count}]`
//! - `DELETE /channels/delete?client_id=<id>` → any 2xx
//! - `POST   /chat/greeting`                  → `{greeting | message | response}`
//!
//! Every request carries basic auth when both credentials are configured.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use serde_json::{json, Value};

use astro_core::ports::HistoryPort;
use astro_types::{
    ChatError, Result,
    config::ChatConfig,
    history::RemoteChannel,
};
use crate::js::basic_auth;
use crate::relay_client::status_error;

pub struct HttpHistoryClient {
    base_url: String,
    admin: String,
    authorization: Option<String>,
}

impl HttpHistoryClient {
    /// `None` when no API base URL is configured.
    pub fn from_config(config: &ChatConfig) -> Option<Self> {
        if !config.has_remote_history() {
            return None;
        }
        let authorization = config
            .credentials()
            .and_then(|(user, pass)| basic_auth(user, pass));
        Some(Self {
            base_url: config.api_url.trim().trim_end_matches('/').to_string(),
            admin: config.admin.clone(),
            authorization,
        })
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.authorization {
            Some(value) => builder.header("Authorization", value),
            None => builder,
        }
    }
}

#[async_trait(?Send)]
impl HistoryPort for HttpHistoryClient {
    async fn list_channels(&self) -> Result<Vec<RemoteChannel>> {
        let url = format!("{}/channels/list", self.base_url);
        let response = self
            .with_auth(Request::get(&url))
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(status_error(response).await);
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| ChatError::Serialization(e.to_string()))?;

        // Anything but an array means "no remote channels"
        let channels = match data {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<RemoteChannel>(item).ok())
                .collect(),
            _ => Vec::new(),
        };
        Ok(channels)
    }

    async fn delete_channel(&self, channel: &str) -> Result<()> {
        let encoded: String = js_sys::encode_uri_component(channel).into();
        let url = format!("{}/channels/delete?client_id={}", self.base_url, encoded);
        let response = self
            .with_auth(Request::delete(&url))
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn greeting(&self, channel: &str, user_id: &str) -> Result<Option<String>> {
        let url = format!("{}/chat/greeting", self.base_url);
        let body = json!({
            "admin": self.admin,
            "user_id": user_id,
            "chat_channel": channel,
        });
        let response = self
            .with_auth(Request::post(&url))
            .header("Content-Type", "application/json")
            .json(&body)
            .map_err(|e| ChatError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(status_error(response).await);
        }

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(_) => return Ok(None),
        };
        let text = ["greeting", "message", "response"]
            .iter()
            .find_map(|field| data.get(*field).and_then(Value::as_str))
            .map(str::to_string);
        Ok(text)
    }
}
