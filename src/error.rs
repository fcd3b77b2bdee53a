//! Error types for RefIA Aviation.

use crate::flow::stage::Stage;

/// Top-level error type for the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Empty completion from {provider}")]
    EmptyCompletion { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Onboarding flow errors.
///
/// Validation failures (`MissingField`, `UnknownSkill`, `AnswerOutOfRange`)
/// map to 422 at the HTTP boundary; everything else is a conflict with the
/// current flow state and maps to 409.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("Action {action} is not available during the {stage} stage")]
    WrongStage { action: &'static str, stage: Stage },

    #[error("Action {action} is not available in the {phase} phase")]
    WrongPhase { action: &'static str, phase: String },

    #[error("Required field {field} is empty")]
    MissingField { field: &'static str },

    #[error("Field {field} is already set and cannot be overwritten")]
    FieldAlreadySet { field: &'static str },

    #[error("Unknown skill label: {label}")]
    UnknownSkill { label: String },

    #[error("At least one skill must be selected")]
    NoSkillsSelected,

    #[error("Answer index {choice} is out of range")]
    AnswerOutOfRange { choice: usize },

    #[error("The current question has already been answered")]
    AlreadyAnswered,

    #[error("The current question has not been answered yet")]
    NotAnswered,

    #[error("Action {action} is already in progress")]
    Busy { action: &'static str },

    #[error("Debrief data is incomplete")]
    DebriefIncomplete,
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, Error>;
