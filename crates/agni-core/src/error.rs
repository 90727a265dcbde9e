//! Error types for agni

use thiserror::Error;

use crate::duration::Duration;

#[derive(Debug, Error)]
pub enum AgniError {
    #[error("Event {index} in the {voice} voice has zero duration")]
    ZeroDuration { voice: String, index: usize },
    #[error("Cannot shorten by {by}: only {remaining} remains in the voice")]
    Overshortened { by: Duration, remaining: Duration },
    #[error("Voice cursor is exhausted")]
    Exhausted,
    #[error("Seek position {index} is past the end of a voice with {len} events")]
    SeekOutOfRange { index: usize, len: usize },
    #[error("Invalid pitch: {0}")]
    InvalidPitch(String),
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    #[error("Multiple count must be at least 1, got {0}")]
    InvalidMultiples(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgniError>;
