//! Hosted single-shot providers: OpenAI-compatible chat completions and
//! Google Gemini `generateContent`.

use serde_json::{json, Value};
use tracing::debug;

use astro_types::config::NO_RESPONSE_TEXT;

use super::{error_details, Reply};
use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostedApi {
    OpenAi,
    Gemini,
}

impl HostedApi {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
        }
    }
}

pub struct HostedProvider {
    client: reqwest::Client,
    api: HostedApi,
    base_url: String,
    api_key: String,
    model: String,
}

impl HostedProvider {
    pub fn new(
        client: reqwest::Client,
        api: HostedApi,
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn api(&self) -> HostedApi {
        self.api
    }

    pub async fn complete(&self, prompt: &str) -> Result<Reply, RelayError> {
        let request = match self.api {
            HostedApi::OpenAi => self
                .client
                .post(format!("{}/v1/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&json!({
                    "model": self.model,
                    "messages": [{ "role": "user", "content": prompt }],
                })),
            HostedApi::Gemini => self
                .client
                .post(format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url, self.model
                ))
                .query(&[("key", self.api_key.as_str())])
                .json(&json!({
                    "contents": [{ "parts": [{ "text": prompt }] }],
                })),
        };

        debug!("{} request (model {})", self.api.display_name(), self.model);
        let response = request.send().await?;
        if !response.status().is_success() {
            let details = error_details(response).await;
            return Err(RelayError::upstream(self.api.display_name(), details));
        }

        let body: Value = response.json().await?;
        let text = match self.api {
            HostedApi::OpenAi => openai_text(&body),
            HostedApi::Gemini => gemini_text(&body),
        };
        Ok(Reply::Complete(
            text.filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| NO_RESPONSE_TEXT.to_string()),
        ))
    }
}

fn openai_text(body: &Value) -> Option<String> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn gemini_text(body: &Value) -> Option<String> {
    let parts = body.pointer("/candidates/0/content/parts")?.as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    Some(text)
}
