//! Ollama over HTTP: `POST /api/generate` with `stream: true`.

use futures::StreamExt;
use serde::Serialize;
use tracing::debug;

use astro_core::frame::FrameFormat;

use super::{error_details, text_fragments, Reply};
use crate::error::RelayError;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

pub struct OllamaHttpProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl OllamaHttpProvider {
    pub fn new(client: reqwest::Client, base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.into(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<Reply, RelayError> {
        debug!("POST {} (model {})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let details = error_details(response).await;
            return Err(RelayError::upstream("remote Ollama", details));
        }

        Ok(Reply::Fragments(text_fragments(
            response.bytes_stream().boxed(),
            FrameFormat::NdJson,
        )))
    }
}
