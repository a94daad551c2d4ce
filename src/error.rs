//! Error types for navi-guide.

use thiserror::Error;

/// Result type alias used across the crate.
pub type NaviResult<T> = Result<T, NaviError>;

#[derive(Error, Debug)]
pub enum NaviError {
    /// Missing credential or unusable settings. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Completion or TTS endpoint unreachable, rejected the request,
    /// or answered with something we could not parse.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for NaviError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            NaviError::Upstream(format!("cannot connect: {err}"))
        } else if err.is_decode() {
            NaviError::Upstream(format!("malformed response: {err}"))
        } else {
            NaviError::Upstream(err.to_string())
        }
    }
}

impl From<hound::Error> for NaviError {
    fn from(err: hound::Error) -> Self {
        NaviError::Audio(format!("WAV write failed: {err}"))
    }
}

impl From<rodio::decoder::DecoderError> for NaviError {
    fn from(err: rodio::decoder::DecoderError) -> Self {
        NaviError::Audio(format!("decode failed: {err}"))
    }
}

impl From<rodio::StreamError> for NaviError {
    fn from(err: rodio::StreamError) -> Self {
        NaviError::Audio(format!("audio output unavailable: {err}"))
    }
}

impl NaviError {
    /// Short machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Upstream(_) => "upstream",
            Self::EmptyInput(_) => "empty_input",
            Self::Audio(_) => "audio",
            Self::Io(_) => "io",
        }
    }
}
