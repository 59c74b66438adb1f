//! rodio failures mapped onto `SoundError`.
//!
//! Both sides are foreign to this crate, so these are plain functions
//! rather than `From` impls. I/O errors already convert via `SoundError::from`.

use rodio::StreamError;
use rodio::decoder::DecoderError;
use rodio::source::SeekError;
use sound_core::SoundError;

pub fn stream_error(err: StreamError) -> SoundError {
    SoundError::Stream(err.to_string())
}

pub fn decode_error(err: DecoderError) -> SoundError {
    SoundError::Decode(err.to_string())
}

pub fn seek_error(err: SeekError) -> SoundError {
    SoundError::Seek(err.to_string())
}
