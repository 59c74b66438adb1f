mod dispatch;
mod sound;

pub use dispatch::HostCallback;
pub use sound::{MODULE_NAME, SoundModule};

use sound_core::{SoundError, TeardownError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },

    #[error("Missing callback for {0}")]
    MissingCallback(String),

    #[error("Audio thread is not running")]
    ChannelClosed,

    #[error("Failed to start audio thread: {0}")]
    Spawn(String),

    #[error(transparent)]
    Sound(#[from] SoundError),

    #[error(transparent)]
    Teardown(#[from] TeardownError),
}
