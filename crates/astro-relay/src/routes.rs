//! HTTP surface: `POST /api/chat` and `GET /health`.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use astro_types::relay::{RelayReply, RelayRequest, CHANNEL_HEADER};

use crate::error::RelayError;
use crate::provider::{Provider, Reply};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<Provider>,
}

impl AppState {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .layer(cors_layer())
        .layer(trace_layer)
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([HeaderName::from_static(CHANNEL_HEADER)])
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "provider": state.provider.name() }))
}

/// The body is parsed by hand so malformed JSON maps to the generic 500
/// instead of axum's own rejection.
async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Response, RelayError> {
    let request: RelayRequest = serde_json::from_slice(&body)?;
    if request.prompt().is_none() {
        return Err(RelayError::EmptyMessage);
    }
    info!(
        provider = state.provider.name(),
        chars = request.message.chars().count(),
        "Relaying message"
    );

    let response = match state.provider.reply(&request).await? {
        Reply::Fragments(stream) => (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
                (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            ],
            Body::from_stream(stream),
        )
            .into_response(),
        Reply::Passthrough { body, channel } => {
            let mut response = (
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
                    (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                ],
                Body::from_stream(body),
            )
                .into_response();
            if let Ok(value) = HeaderValue::from_str(&channel) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(CHANNEL_HEADER), value);
            }
            response
        }
        Reply::Complete(text) => Json(RelayReply { response: text }).into_response(),
    };
    Ok(response)
}
