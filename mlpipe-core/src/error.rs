//! Error types for the mlpipe-core crate.

use thiserror::Error;

/// Top-level error type for pipeline operations.
///
/// Every stage failure surfaces as one of these variants and propagates
/// unchanged through the orchestrator; nothing is caught and suppressed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing key `{key}` in {document}")]
    MissingKey { key: String, document: String },

    #[error("Schema validation failed: {0}")]
    Schema(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn missing_key(key: impl Into<String>, document: impl Into<String>) -> Self {
        Self::MissingKey {
            key: key.into(),
            document: document.into(),
        }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}
