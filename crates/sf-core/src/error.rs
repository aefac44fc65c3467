//! Error types for sf-core

use thiserror::Error;

/// Core error type for SchemaForge
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Project directory not found
    #[error("[E003] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E004: Change unit source cannot be enumerated
    #[error("[E004] Change unit catalog unreadable at '{path}': {reason}")]
    CatalogUnreadable { path: String, reason: String },

    /// E005: Change unit violates the unit contract
    #[error("[E005] Malformed change unit '{name}': {reason}")]
    MalformedUnit { name: String, reason: String },

    /// E006: Two units share the same name
    #[error("[E006] Duplicate change unit '{name}' in {path1} and {path2}")]
    DuplicateUnit {
        name: String,
        path1: String,
        path2: String,
    },

    /// E007: Seed file could not be parsed or is inconsistent
    #[error("[E007] Invalid seed file {path}: {reason}")]
    InvalidSeed { path: String, reason: String },

    /// E008: Secret value could not be resolved
    #[error("[E008] Secret for column '{column}' unavailable: {reason}")]
    SecretUnavailable { column: String, reason: String },

    /// E009: IO error with file path context
    #[error("[E009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E010: IO error
    #[error("[E010] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E011: YAML parse error
    #[error("[E011] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
