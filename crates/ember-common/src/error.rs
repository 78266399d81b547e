//! Error types for Ember.

use thiserror::Error;

use crate::ids::TextureHandle;

/// Top-level error type for Ember operations.
#[derive(Debug, Error)]
pub enum EmberError {
    /// Animation/texture resource errors
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Animation and texture resource errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No animation registered under the requested name
    #[error("Animation not found: {0}")]
    AnimationNotFound(String),

    /// Handle does not refer to a loaded resource
    #[error("Invalid texture handle: {0:?}")]
    InvalidHandle(TextureHandle),

    /// Animation with no frames
    #[error("Animation '{0}' has no frames")]
    EmptyAnimation(String),

    /// No handle range left for the animation's frames
    #[error("Texture handles exhausted registering '{0}'")]
    HandlesExhausted(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a config document
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Failed to serialize a config document
    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Result type alias for Ember operations.
pub type EmberResult<T> = Result<T, EmberError>;
