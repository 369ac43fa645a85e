//! Relay configuration: command-line flags with environment fallbacks.

use std::net::SocketAddr;
use clap::{Parser, ValueEnum};

/// Which upstream answers chat messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// Local Ollama daemon over HTTP (`/api/generate`, NDJSON stream)
    OllamaHttp,
    /// Local Ollama binary run as a subprocess
    OllamaProcess,
    /// OpenAI-compatible chat completions (single shot)
    Openai,
    /// Google Gemini `generateContent` (single shot)
    Gemini,
    /// Remote RAG service streaming server-sent events
    Rag,
}

impl ProviderKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OllamaHttp => "ollama-http",
            Self::OllamaProcess => "ollama-process",
            Self::Openai => "openai",
            Self::Gemini => "gemini",
            Self::Rag => "rag",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OllamaHttp | Self::OllamaProcess => "gemma3:1b",
            Self::Openai => "gpt-4o-mini",
            Self::Gemini => "gemini-1.5-flash",
            Self::Rag => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "astro-relay", version, about = "Streaming chat relay")]
pub struct RelayConfig {
    /// Address to listen on
    #[arg(long, env = "RELAY_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    #[arg(long, env = "RELAY_PROVIDER", value_enum, default_value_t = ProviderKind::OllamaHttp)]
    pub provider: ProviderKind,

    /// Model name; defaults depend on the provider
    #[arg(long, env = "RELAY_MODEL")]
    pub model: Option<String>,

    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Binary used by the `ollama-process` provider (`<command> run <model>`)
    #[arg(long, env = "OLLAMA_COMMAND", default_value = "ollama")]
    pub ollama_command: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com")]
    pub openai_base_url: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = "https://generativelanguage.googleapis.com")]
    pub gemini_base_url: String,

    /// Base URL of the RAG service (`<url>/stream`)
    #[arg(long = "rag-url", env = "RAG_API_URL")]
    pub rag_url: Option<String>,

    /// Tenant tag sent to the RAG service when the client sends none
    #[arg(long, env = "RAG_ADMIN")]
    pub rag_admin: Option<String>,

    #[arg(long, env = "API_USERNAME")]
    pub api_username: Option<String>,

    #[arg(long, env = "API_PASSWORD", hide_env_values = true)]
    pub api_password: Option<String>,

    #[arg(long, env = "RELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl RelayConfig {
    pub fn model(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Basic-auth credentials for the RAG service, only when both are set.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.api_username, &self.api_password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user.clone(), pass.clone()))
            }
            _ => None,
        }
    }
}
