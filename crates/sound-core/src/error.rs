use std::fmt;

use thiserror::Error;

use crate::types::ErrorPayload;

#[derive(Error, Debug)]
pub enum SoundError {
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Failed to prepare player {key}: {reason}")]
    PrepareFailed { key: i32, reason: String },

    #[error("Key {0} already holds a live player")]
    KeyInUse(i32),

    #[error("Failed to open file: {0}")]
    FileOpen(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Seek error: {0}")]
    Seek(String),

    #[error("Stream error: {0}")]
    Stream(String),
}

impl SoundError {
    /// Numeric code handed to the host on the error side of a callback.
    pub fn code(&self) -> i32 {
        match self {
            SoundError::ResourceNotFound(_) => -1,
            SoundError::PrepareFailed { .. } => -2,
            SoundError::KeyInUse(_) => -3,
            _ => -4,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let message = match self {
            SoundError::ResourceNotFound(_) => "resource not found".to_string(),
            other => other.to_string(),
        };
        ErrorPayload {
            code: self.code(),
            message,
        }
    }
}

impl From<std::io::Error> for SoundError {
    fn from(err: std::io::Error) -> Self {
        SoundError::FileOpen(err.to_string())
    }
}

/// Every failure collected while tearing down a registry.
///
/// Teardown never stops at the first broken player; each entry is closed
/// and the failures are reported together.
#[derive(Error, Debug)]
pub struct TeardownError {
    pub failures: Vec<(i32, SoundError)>,
}

impl fmt::Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} player(s) failed to close", self.failures.len())?;
        for (key, err) in &self.failures {
            write!(f, "; key {}: {}", key, err)?;
        }
        Ok(())
    }
}
