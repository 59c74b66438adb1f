//! Seams between the registry and whatever actually plays audio.
//!
//! Implementations: `RodioBackend` in sound-host, `MockBackend` for tests.

use std::path::{Path, PathBuf};

use crate::error::SoundError;

/// Where a source string ended up after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    /// Found in the bundled resource directory.
    Bundled(PathBuf),
    /// Found on the filesystem as given.
    File(PathBuf),
}

impl ResolvedSource {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedSource::Bundled(path) | ResolvedSource::File(path) => path,
        }
    }
}

/// Terminal notification raised by a native player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Natural end of the source was reached.
    Completed,
    /// Native playback failed.
    Error { what: i32, extra: i32 },
}

pub trait AudioBackend {
    type Player: NativePlayer;

    /// Resolve a caller-supplied source, bundled resources first.
    fn resolve(&self, source: &str) -> Option<ResolvedSource>;

    /// Construct an unprepared player for a resolved source.
    fn open(&mut self, source: &ResolvedSource) -> Result<Self::Player, SoundError>;
}

/// One native audio player. Positions are in milliseconds.
pub trait NativePlayer {
    /// Synchronous preparation; after success the duration is known.
    fn prepare(&mut self) -> Result<(), SoundError>;

    fn duration_ms(&self) -> u64;

    fn start(&mut self) -> Result<(), SoundError>;

    fn pause(&mut self) -> Result<(), SoundError>;

    fn seek_to(&mut self, position_ms: u64) -> Result<(), SoundError>;

    fn position_ms(&self) -> u64;

    fn is_playing(&self) -> bool;

    fn set_volume(&mut self, left: f32, right: f32);

    fn set_looping(&mut self, looping: bool);

    fn is_looping(&self) -> bool;

    /// Hard stop used during teardown.
    fn stop(&mut self) -> Result<(), SoundError>;

    fn reset(&mut self) -> Result<(), SoundError>;

    fn release(&mut self) -> Result<(), SoundError>;

    /// Next pending terminal notification, if any.
    fn poll_event(&mut self) -> Option<PlaybackEvent>;
}
