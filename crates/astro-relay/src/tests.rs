#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use clap::Parser;

    use crate::config::{LogFormat, ProviderKind, RelayConfig};
    use crate::error::RelayError;
    use crate::provider::Provider;

    fn parse(args: &[&str]) -> RelayConfig {
        let mut argv = vec!["astro-relay"];
        argv.extend_from_slice(args);
        RelayConfig::try_parse_from(argv).unwrap()
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_model_defaults_follow_provider() {
        let config = parse(&["--provider", "ollama-process", "--model", ""]);
        assert_eq!(config.provider, ProviderKind::OllamaProcess);
        assert_eq!(config.model(), "gemma3:1b");

        let config = parse(&["--provider", "gemini", "--model", "gemini-pro"]);
        assert_eq!(config.model(), "gemini-pro");
    }

    #[test]
    fn test_log_format_flag() {
        let config = parse(&["--log-format", "json"]);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_credentials_need_both_parts() {
        let config = parse(&["--api-username", "user", "--api-password", ""]);
        assert_eq!(config.credentials(), None);

        let config = parse(&["--api-username", "user", "--api-password", "pass"]);
        assert_eq!(config.credentials(), Some(("user".to_string(), "pass".to_string())));
    }

    #[test]
    fn test_hosted_provider_requires_key() {
        let config = parse(&["--provider", "openai", "--openai-api-key", ""]);
        assert!(Provider::from_config(&config).is_err());

        let config = parse(&["--provider", "openai", "--openai-api-key", "k"]);
        let provider = Provider::from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_rag_provider_requires_url() {
        let config = parse(&["--provider", "rag", "--rag-url", " "]);
        assert!(Provider::from_config(&config).is_err());

        let config = parse(&["--provider", "rag", "--rag-url", "http://rag.local"]);
        assert_eq!(Provider::from_config(&config).unwrap().name(), "rag");
    }

    // ─── Error Mapping Tests ─────────────────────────────────

    #[test]
    fn test_error_status_codes() {
        assert_eq!(RelayError::EmptyMessage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::upstream("remote Ollama", "x").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RelayError::internal("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_error_message() {
        match RelayError::upstream("remote Ollama", "model overloaded") {
            RelayError::Upstream { error, details } => {
                assert_eq!(error, "Failed to fetch from remote Ollama.");
                assert_eq!(details, "model overloaded");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
