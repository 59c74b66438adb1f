mod engine;
mod error;
mod gain;
mod looping;

pub use engine::{MEDIA_ERROR_IO, MEDIA_ERROR_UNKNOWN, RodioBackend, RodioPlayer};
pub use error::{decode_error, seek_error, stream_error};
pub use gain::{StereoGain, StereoGains};
pub use looping::{LoopState, Looping};


#[cfg(test)]
#[path = "gain_test.rs"]
mod gain_test;
