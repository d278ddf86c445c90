//! Error types for scribe modules using thiserror.

use thiserror::Error;

/// Errors from a single generation backend attempt.
///
/// Any of these advances the fallback chain to the next backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend '{model}' timed out after {seconds}s")]
    Timeout { model: String, seconds: u64 },

    #[error("Request to backend '{model}' failed: {source}")]
    Request {
        model: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Backend '{model}' returned an unusable response: {detail}")]
    InvalidResponse { model: String, detail: String },
}

impl BackendError {
    /// The model id the failed attempt targeted.
    pub fn model(&self) -> &str {
        match self {
            BackendError::Timeout { model, .. }
            | BackendError::Request { model, .. }
            | BackendError::InvalidResponse { model, .. } => model,
        }
    }
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("No changes to commit (working tree is clean)")]
    NoChanges,

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from metrics persistence.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to append metric: {0}")]
    AppendFailed(#[source] std::io::Error),

    #[error("Failed to serialize metric: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("Failed to read metrics file: {0}")]
    ReadFailed(#[source] std::io::Error),
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "OpenRouter API key missing. Set the OPENROUTER_API_KEY environment variable or run 'scribe --setup'"
    )]
    MissingApiKey,
}
