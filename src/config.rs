//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::LlmBackend;

/// Application configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// LLM backend used for quiz generation and mission analysis.
    pub backend: LlmBackend,
    /// Model identifier passed to the backend.
    pub model: String,
    /// API key for the selected backend.
    pub api_key: SecretString,
    /// Port the REST server listens on.
    pub port: u16,
}

impl AppConfig {
    /// Default model per backend.
    fn default_model(backend: LlmBackend) -> &'static str {
        match backend {
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
            LlmBackend::OpenAi => "gpt-4o-mini",
        }
    }

    /// Build the configuration from environment variables.
    ///
    /// - `REFIA_BACKEND`: `anthropic` (default) or `openai`
    /// - `REFIA_MODEL`: model id, defaults per backend
    /// - `REFIA_PORT`: listen port, defaults to 8080
    /// - `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`: key for the chosen backend
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match std::env::var("REFIA_BACKEND").as_deref() {
            Err(_) | Ok("anthropic") => LlmBackend::Anthropic,
            Ok("openai") => LlmBackend::OpenAi,
            Ok(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "REFIA_BACKEND".to_string(),
                    message: format!("unknown backend {other:?}, expected anthropic or openai"),
                });
            }
        };

        let key_var = match backend {
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
        };
        let api_key = std::env::var(key_var)
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = std::env::var("REFIA_MODEL")
            .unwrap_or_else(|_| Self::default_model(backend).to_string());

        let port = match std::env::var("REFIA_PORT") {
            Err(_) => 8080,
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "REFIA_PORT".to_string(),
                message: format!("{raw:?} is not a valid port"),
            })?,
        };

        Ok(Self {
            backend,
            model,
            api_key,
            port,
        })
    }
}
