//! Error types for relnotes

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using RelnotesError
pub type Result<T> = std::result::Result<T, RelnotesError>;

/// Main error type for relnotes operations
#[derive(Debug, Error)]
pub enum RelnotesError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Changelog pipeline errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Changelog pipeline errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// A tag does not resolve to a commit
    #[error("Tag '{tag}' does not resolve to a commit")]
    RefNotFound { tag: String },

    /// The repository's earliest commit could not be determined
    #[error("Could not determine repository origin: {0}")]
    OriginNotFound(String),

    /// Every commit range strategy failed
    #[error("Commit range for {head} unavailable: {reason}")]
    RangeUnavailable { head: String, reason: String },

    /// The host rejected the repository itself
    #[error("Repository {owner}/{repo} unavailable: {reason}")]
    RepositoryUnavailable {
        owner: String,
        repo: String,
        reason: String,
    },
}
