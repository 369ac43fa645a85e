//! Relay errors and their HTTP mapping.
//!
//! | variant        | status | body                                         |
//! |----------------|--------|----------------------------------------------|
//! | `EmptyMessage` | 400    | `{"error": "No message provided."}`          |
//! | `Upstream`     | 502    | `{"error": ..., "details": <upstream body>}` |
//! | `Internal`     | 500    | `{"error": "Failed to process request."}`    |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use astro_types::relay::ErrorBody;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("No message provided.")]
    EmptyMessage,

    /// The upstream answered with a non-success status
    #[error("{error} {details}")]
    Upstream { error: String, details: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn upstream(provider: &str, details: impl Into<String>) -> Self {
        Self::Upstream {
            error: format!("Failed to fetch from {}.", provider),
            details: details.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyMessage => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            Self::EmptyMessage => ErrorBody {
                error: "No message provided.".to_string(),
                details: None,
            },
            Self::Upstream { error, details } => {
                warn!("{} {}", error, details);
                ErrorBody {
                    error,
                    details: Some(details),
                }
            }
            Self::Internal(msg) => {
                error!("Error processing request: {}", msg);
                ErrorBody {
                    error: "Failed to process request.".to_string(),
                    details: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}
