//! Error types for song construction.
//!
//! Every failure surfaces while a piece is being assembled. Once a song, an
//! instrument or a wav layout exists, rendering it cannot fail.

use thiserror::Error;

/// Result type for gridsynth operations.
pub type Result<T> = std::result::Result<T, SynthError>;

/// Errors that can occur while assembling a piece.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Malformed notation text or note name.
    #[error("format error: {0}")]
    Format(String),

    /// A value outside its allowed range (sample rate, frequency, duration...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Song file could not be deserialized.
    #[error("invalid song file: {0}")]
    Config(#[from] toml::de::Error),

    /// Song settings could not be serialized into a cache key.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while loading a song file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Creates a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True for errors caused by malformed notation or note names.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }

    /// True for errors caused by out-of-range values.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
