//! Error types for the schema pipeline

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Schema pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Schema file not found: {0}")]
    SchemaNotFound(String),

    #[error("Property path not found: {0}")]
    PathNotFound(String),

    #[error("Definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("Invalid schema format in {path}: {reason}")]
    InvalidFormat { path: String, reason: String },

    #[error("Duplicate spec id {id} in {path}")]
    DuplicateSpecId { id: String, path: String },

    #[error("Malformed spec id {id} in {path}: expected PREFIX-ENTITY-NNN")]
    MalformedSpecId { id: String, path: String },

    #[error("Invalid generated identifier: {0}")]
    InvalidIdentifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
