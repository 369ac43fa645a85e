//! Remote RAG service: the request is forwarded to `{url}/stream` and its
//! server-sent events are piped to the client untouched.

use futures::{StreamExt, TryStreamExt};
use tracing::debug;

use astro_types::message::new_channel_id;
use astro_types::relay::{RelayRequest, CHANNEL_HEADER};

use super::{error_details, Reply};
use crate::error::RelayError;

pub struct RagProvider {
    client: reqwest::Client,
    endpoint: String,
    admin: Option<String>,
    credentials: Option<(String, String)>,
}

impl RagProvider {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        admin: Option<String>,
        credentials: Option<(String, String)>,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/stream", base_url.trim_end_matches('/')),
            admin,
            credentials,
        }
    }

    pub async fn stream(&self, request: &RelayRequest) -> Result<Reply, RelayError> {
        let mut forwarded = request.clone();
        if forwarded.admin.as_deref().is_none_or(str::is_empty) {
            forwarded.admin = self.admin.clone();
        }

        debug!("POST {}", self.endpoint);
        let mut builder = self.client.post(&self.endpoint).json(&forwarded);
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let details = error_details(response).await;
            return Err(RelayError::upstream("RAG service", details));
        }

        let channel = response
            .headers()
            .get(CHANNEL_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string)
            .or_else(|| request.chat_channel.clone().filter(|c| !c.trim().is_empty()))
            .unwrap_or_else(new_channel_id);

        let body = response
            .bytes_stream()
            .map_err(|e| std::io::Error::other(e.to_string()))
            .boxed();
        Ok(Reply::Passthrough { body, channel })
    }
}
