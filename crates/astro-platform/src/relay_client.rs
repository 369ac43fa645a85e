//! Streaming relay adapter.
//!
//! Posts the user message with browser `fetch()` via gloo-net, then reads the
//! response body through a `ReadableStreamDefaultReader` so fragments reach
//! the chat pane as soon as the browser hands them over.

use async_trait::async_trait;
use futures::stream;
use gloo_net::http::{Request, Response};
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

use astro_core::ports::{ByteStream, RelayPort, RelayResponse};
use astro_types::{
    ChatError, Result,
    relay::{ErrorBody, RelayRequest, CHANNEL_HEADER},
};
use crate::js::describe;

pub struct HttpRelayClient {
    url: String,
}

impl HttpRelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait(?Send)]
impl RelayPort for HttpRelayClient {
    async fn send(&self, req: RelayRequest) -> Result<RelayResponse> {
        let response = Request::post(&self.url)
            .header("Content-Type", "application/json")
            .json(&req)
            .map_err(|e| ChatError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(status_error(response).await);
        }

        let content_type = response.headers().get("content-type");
        let channel = response.headers().get(CHANNEL_HEADER);
        log::debug!(
            "Relay answered {} ({:?}, channel {:?})",
            response.status(),
            content_type,
            channel
        );

        Ok(RelayResponse {
            content_type,
            channel,
            body: body_stream(&response)?,
        })
    }
}

/// Turn a non-success response into `ChatError::Status`, preferring the
/// relay's `{error, details}` payload over the raw body text.
pub(crate) async fn status_error(response: Response) -> ChatError {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());

    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody { error, details: Some(details) }) => format!("{} ({})", error, details),
        Ok(ErrorBody { error, details: None }) => error,
        Err(_) if text.trim().is_empty() => response.status_text(),
        Err(_) => text,
    };
    ChatError::Status { status, message }
}

fn body_stream(response: &Response) -> Result<ByteStream> {
    let Some(body) = response.body() else {
        return Ok(Box::pin(stream::empty()));
    };

    let reader: ReadableStreamDefaultReader = body
        .get_reader()
        .dyn_into()
        .map_err(|e| ChatError::JsInterop(describe(&e)))?;

    let chunks = stream::unfold(Some(reader), |reader| async move {
        let reader = reader?;
        match read_chunk(&reader).await {
            Ok(Some(bytes)) => Some((Ok(bytes), Some(reader))),
            Ok(None) => None,
            // Report the failure once, then end the stream
            Err(e) => Some((Err(e), None)),
        }
    });
    Ok(Box::pin(chunks))
}

/// One `reader.read()`; `None` once the stream is done.
async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read())
        .await
        .map_err(|e| ChatError::Network(describe(&e)))?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(|e| ChatError::JsInterop(describe(&e)))?
        .as_bool()
        .unwrap_or(true);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value"))
        .map_err(|e| ChatError::JsInterop(describe(&e)))?;
    Ok(Some(Uint8Array::new(&value).to_vec()))
}
