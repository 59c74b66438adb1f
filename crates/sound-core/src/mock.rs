//! Scriptable in-memory backend.
//!
//! Players never produce sound; tests drive completion and failure through
//! a `MockHandle`. Clones of a `MockBackend` share state, so a test can keep
//! one after handing another to a registry on a different thread.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{AudioBackend, NativePlayer, PlaybackEvent, ResolvedSource};
use crate::error::SoundError;

/// How a scripted source behaves.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    pub duration_ms: u64,
    pub fail_open: bool,
    pub fail_prepare: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub fail_release: bool,
}

impl MockSource {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct BackendState {
    sources: HashMap<String, MockSource>,
    opened: Vec<(String, MockHandle)>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, name: &str, duration_ms: u64) -> Self {
        self.with_source_config(name, MockSource::new(duration_ms))
    }

    pub fn with_source_config(self, name: &str, source: MockSource) -> Self {
        self.state.lock().sources.insert(name.to_string(), source);
        self
    }

    /// Most recently opened player for `name`.
    pub fn handle(&self, name: &str) -> Option<MockHandle> {
        self.state
            .lock()
            .opened
            .iter()
            .rev()
            .find(|(opened, _)| opened == name)
            .map(|(_, handle)| handle.clone())
    }

    pub fn opened_count(&self) -> usize {
        self.state.lock().opened.len()
    }
}

impl AudioBackend for MockBackend {
    type Player = MockPlayer;

    fn resolve(&self, source: &str) -> Option<ResolvedSource> {
        let state = self.state.lock();
        state
            .sources
            .contains_key(source)
            .then(|| ResolvedSource::Bundled(PathBuf::from(source)))
    }

    fn open(&mut self, source: &ResolvedSource) -> Result<MockPlayer, SoundError> {
        let name = source.path().to_string_lossy().into_owned();
        let mut state = self.state.lock();
        let config = state
            .sources
            .get(&name)
            .cloned()
            .ok_or_else(|| SoundError::FileOpen(name.clone()))?;
        if config.fail_open {
            return Err(SoundError::FileOpen(format!("cannot open {}", name)));
        }

        let handle = MockHandle {
            state: Arc::new(Mutex::new(PlayerState {
                config,
                volume: (1.0, 1.0),
                ..PlayerState::default()
            })),
        };
        state.opened.push((name, handle.clone()));
        Ok(MockPlayer { handle })
    }
}

#[derive(Debug, Default)]
struct PlayerState {
    config: MockSource,
    prepared: bool,
    playing: bool,
    looping: bool,
    position_ms: u64,
    volume: (f32, f32),
    events: VecDeque<PlaybackEvent>,
    start_count: usize,
    stop_count: usize,
    reset_count: usize,
    released: bool,
}

/// Test-side view of one mock player.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<PlayerState>>,
}

impl MockHandle {
    /// Reach the natural end of the source.
    pub fn finish(&self) {
        let mut state = self.state.lock();
        if state.looping {
            state.position_ms = 0;
        } else {
            state.playing = false;
            state.position_ms = state.config.duration_ms;
        }
        state.events.push_back(PlaybackEvent::Completed);
    }

    /// Raise a native playback failure.
    pub fn fail(&self, what: i32, extra: i32) {
        let mut state = self.state.lock();
        state.playing = false;
        state.events.push_back(PlaybackEvent::Error { what, extra });
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    pub fn is_prepared(&self) -> bool {
        self.state.lock().prepared
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    pub fn position_ms(&self) -> u64 {
        self.state.lock().position_ms
    }

    pub fn volume(&self) -> (f32, f32) {
        self.state.lock().volume
    }

    pub fn start_count(&self) -> usize {
        self.state.lock().start_count
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().stop_count
    }

    pub fn reset_count(&self) -> usize {
        self.state.lock().reset_count
    }
}

#[derive(Debug)]
pub struct MockPlayer {
    handle: MockHandle,
}

impl NativePlayer for MockPlayer {
    fn prepare(&mut self) -> Result<(), SoundError> {
        let mut state = self.handle.state.lock();
        if state.config.fail_prepare {
            return Err(SoundError::Decode("prepare failed".to_string()));
        }
        state.prepared = true;
        Ok(())
    }

    fn duration_ms(&self) -> u64 {
        self.handle.state.lock().config.duration_ms
    }

    fn start(&mut self) -> Result<(), SoundError> {
        let mut state = self.handle.state.lock();
        if state.config.fail_start {
            return Err(SoundError::Playback("start failed".to_string()));
        }
        if state.position_ms >= state.config.duration_ms {
            state.position_ms = 0;
        }
        state.playing = true;
        state.start_count += 1;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SoundError> {
        self.handle.state.lock().playing = false;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), SoundError> {
        let mut state = self.handle.state.lock();
        state.position_ms = position_ms.min(state.config.duration_ms);
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        self.handle.state.lock().position_ms
    }

    fn is_playing(&self) -> bool {
        self.handle.state.lock().playing
    }

    fn set_volume(&mut self, left: f32, right: f32) {
        self.handle.state.lock().volume = (left, right);
    }

    fn set_looping(&mut self, looping: bool) {
        self.handle.state.lock().looping = looping;
    }

    fn is_looping(&self) -> bool {
        self.handle.state.lock().looping
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        let mut state = self.handle.state.lock();
        state.stop_count += 1;
        if state.config.fail_stop {
            return Err(SoundError::Playback("stop failed".to_string()));
        }
        state.playing = false;
        state.position_ms = 0;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SoundError> {
        let mut state = self.handle.state.lock();
        state.reset_count += 1;
        state.prepared = false;
        Ok(())
    }

    fn release(&mut self) -> Result<(), SoundError> {
        let mut state = self.handle.state.lock();
        state.released = true;
        state.playing = false;
        if state.config.fail_release {
            return Err(SoundError::Playback("release failed".to_string()));
        }
        Ok(())
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        self.handle.state.lock().events.pop_front()
    }
}
