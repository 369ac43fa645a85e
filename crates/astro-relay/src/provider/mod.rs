//! Upstream providers.
//!
//! Every provider turns one prompt into one [`Reply`]. Errors raised before
//! the reply starts map to HTTP statuses; once a stream has started the
//! status is already sent, so a broken upstream simply ends the body early.

mod hosted;
mod ollama;
mod process;
mod rag;

use std::io;
use std::time::Duration;

use anyhow::{bail, Result};
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

use astro_core::frame::{Frame, FrameDecoder, FrameFormat};
use astro_types::relay::RelayRequest;

use crate::config::{ProviderKind, RelayConfig};
use crate::error::RelayError;

pub use hosted::{HostedApi, HostedProvider};
pub use ollama::OllamaHttpProvider;
pub use process::OllamaProcessProvider;
pub use rag::RagProvider;

/// Response body as relayed to the client
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// What a provider produced for one prompt
pub enum Reply {
    /// Plain text fragments, relayed as `text/plain`
    Fragments(BodyStream),
    /// An upstream event stream piped through untouched
    Passthrough { body: BodyStream, channel: String },
    /// One complete answer, returned as `{"response": ...}`
    Complete(String),
}

pub enum Provider {
    OllamaHttp(OllamaHttpProvider),
    OllamaProcess(OllamaProcessProvider),
    Hosted(HostedProvider),
    Rag(RagProvider),
}

impl Provider {
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        let model = config.model();
        let provider = match config.provider {
            ProviderKind::OllamaHttp => Self::OllamaHttp(OllamaHttpProvider::new(
                http_client()?,
                &config.ollama_url,
                model,
            )),
            ProviderKind::OllamaProcess => Self::OllamaProcess(OllamaProcessProvider::new(
                config.ollama_command.clone(),
                model,
            )),
            ProviderKind::Openai => {
                let Some(key) = config.openai_api_key.clone().filter(|k| !k.is_empty()) else {
                    bail!("OPENAI_API_KEY is required for the openai provider");
                };
                Self::Hosted(HostedProvider::new(
                    http_client()?,
                    HostedApi::OpenAi,
                    &config.openai_base_url,
                    key,
                    model,
                ))
            }
            ProviderKind::Gemini => {
                let Some(key) = config.gemini_api_key.clone().filter(|k| !k.is_empty()) else {
                    bail!("GEMINI_API_KEY is required for the gemini provider");
                };
                Self::Hosted(HostedProvider::new(
                    http_client()?,
                    HostedApi::Gemini,
                    &config.gemini_base_url,
                    key,
                    model,
                ))
            }
            ProviderKind::Rag => {
                let Some(url) = config.rag_url.clone().filter(|u| !u.trim().is_empty()) else {
                    bail!("RAG_API_URL is required for the rag provider");
                };
                Self::Rag(RagProvider::new(
                    http_client()?,
                    &url,
                    config.rag_admin.clone(),
                    config.credentials(),
                ))
            }
        };
        Ok(provider)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OllamaHttp(_) => ProviderKind::OllamaHttp.label(),
            Self::OllamaProcess(_) => ProviderKind::OllamaProcess.label(),
            Self::Hosted(p) => p.api().label(),
            Self::Rag(_) => ProviderKind::Rag.label(),
        }
    }

    /// Ask the upstream once. The message is forwarded as the client sent
    /// it; callers reject blank messages first.
    pub async fn reply(&self, request: &RelayRequest) -> Result<Reply, RelayError> {
        let prompt = request.message.as_str();
        match self {
            Self::OllamaHttp(p) => p.generate(prompt).await,
            Self::OllamaProcess(p) => p.run(prompt).await,
            Self::Hosted(p) => p.complete(prompt).await,
            Self::Rag(p) => p.stream(request).await,
        }
    }
}

fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

/// Read the body of a failed upstream response for the error payload.
async fn error_details(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => status.to_string(),
        Err(e) => format!("{} (body unreadable: {})", status, e),
    }
}

// ─── Decoded fragment streams ────────────────────────────────

struct Decoding {
    upstream: BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: FrameDecoder,
    pending: std::collections::VecDeque<String>,
    finished: bool,
}

impl Decoding {
    fn absorb(&mut self, frames: Vec<Frame>) {
        for frame in frames {
            match frame {
                Frame::Text(text) => self.pending.push_back(text),
                Frame::Done => {
                    self.finished = true;
                    break;
                }
                Frame::Metadata { .. } => {}
            }
        }
    }
}

/// Decode an upstream body with the shared frame decoder and re-emit only
/// the text fragments. Ends at the upstream's completion frame, even if the
/// upstream keeps the connection open.
fn text_fragments(
    upstream: BoxStream<'static, reqwest::Result<Bytes>>,
    format: FrameFormat,
) -> BodyStream {
    let state = Decoding {
        upstream,
        decoder: FrameDecoder::new(format),
        pending: Default::default(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(text) = st.pending.pop_front() {
                return Some((Ok(Bytes::from(text)), st));
            }
            if st.finished {
                return None;
            }
            match st.upstream.next().await {
                Some(Ok(chunk)) => {
                    let frames = st.decoder.decode(&chunk);
                    st.absorb(frames);
                }
                Some(Err(e)) => {
                    tracing::error!("Upstream stream failed: {}", e);
                    st.finished = true;
                    return Some((Err(io::Error::other(e.to_string())), st));
                }
                None => {
                    let frames = st.decoder.finish();
                    st.absorb(frames);
                    st.finished = true;
                }
            }
        }
    })
    .boxed()
}
