use crate::audio::error::{decode_error, seek_error, stream_error};
use crate::audio::gain::{StereoGain, StereoGains};
use crate::audio::looping::{LoopState, Looping};
use log::{debug, warn};
use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use sound_core::{
    AudioBackend, NativePlayer, PlaybackEvent, ResolvedSource, SoundError, SourceResolver,
};
use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// `what` code for failures with no better classification.
pub const MEDIA_ERROR_UNKNOWN: i32 = 1;
/// `extra` code for file or stream I/O failures.
pub const MEDIA_ERROR_IO: i32 = -1004;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Opens players on the default output device.
///
/// Must stay on the thread that created it; the output stream is not
/// guaranteed to be `Send` on every platform.
pub struct RodioBackend {
    stream: OutputStream,
    resolver: SourceResolver,
}

impl RodioBackend {
    pub fn new(resolver: SourceResolver) -> Result<Self, SoundError> {
        let stream = OutputStreamBuilder::open_default_stream().map_err(stream_error)?;
        Ok(Self { stream, resolver })
    }
}

impl AudioBackend for RodioBackend {
    type Player = RodioPlayer;

    fn resolve(&self, source: &str) -> Option<ResolvedSource> {
        self.resolver.resolve(source)
    }

    fn open(&mut self, source: &ResolvedSource) -> Result<RodioPlayer, SoundError> {
        Ok(RodioPlayer::new(
            self.stream.mixer().clone(),
            source.path().to_path_buf(),
        ))
    }
}

/// One file bound to its own sink on the shared mixer.
pub struct RodioPlayer {
    mixer: Mixer,
    path: PathBuf,
    sink: Option<Sink>,
    gains: Arc<StereoGains>,
    looping: Arc<LoopState>,
    state: PlaybackState,
    duration_ms: u64,
    events: VecDeque<PlaybackEvent>,
    released: bool,
}

impl RodioPlayer {
    pub(crate) fn new(mixer: Mixer, path: PathBuf) -> Self {
        Self {
            mixer,
            path,
            sink: None,
            gains: Arc::new(StereoGains::default()),
            looping: Arc::new(LoopState::default()),
            state: PlaybackState::Stopped,
            duration_ms: 0,
            events: VecDeque::new(),
            released: false,
        }
    }

    fn decode(path: &Path) -> Result<Decoder<BufReader<File>>, SoundError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Decoder::new(reader).map_err(decode_error)
    }

    /// New paused sink holding the full source chain for `source`.
    fn connect(&self, source: Decoder<BufReader<File>>) -> Sink {
        let sink = Sink::connect_new(&self.mixer);
        sink.pause();
        let looped = Looping::new(source, Arc::clone(&self.looping));
        sink.append(StereoGain::new(looped, Arc::clone(&self.gains)));
        sink
    }

    /// Replace the sink with a fresh decoder positioned at `position_ms`.
    fn load(&mut self, position_ms: u64, play: bool) -> Result<(), SoundError> {
        let source = Self::decode(&self.path)?;

        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let sink = self.connect(source);
        self.looping.clear_wraps();

        if position_ms > 0 {
            sink.try_seek(Duration::from_millis(position_ms)).map_err(seek_error)?;
        }

        if play {
            sink.play();
            self.state = PlaybackState::Playing;
        } else if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }

        self.sink = Some(sink);
        Ok(())
    }

    fn seek_forward(&mut self, position_ms: u64) -> Result<(), SoundError> {
        match self.sink {
            Some(ref sink) => sink
                .try_seek(Duration::from_millis(position_ms))
                .map_err(seek_error),
            None => Err(SoundError::Playback("player not prepared".to_string())),
        }
    }

    fn drained(&self) -> bool {
        self.sink.as_ref().is_none_or(|sink| sink.empty())
    }

    fn ensure_live(&self) -> Result<(), SoundError> {
        if self.released {
            Err(SoundError::Playback("player released".to_string()))
        } else {
            Ok(())
        }
    }

    /// Turn a drained sink into the matching terminal event.
    ///
    /// A looping source only drains if it could not rewind itself, in which
    /// case the file is reloaded from the top.
    fn check_finished(&mut self) {
        if self.state != PlaybackState::Playing || !self.drained() {
            return;
        }

        if self.looping.enabled() {
            debug!("Looping {}", self.path.display());
            if let Err(e) = self.load(0, true) {
                warn!("Failed to loop {}: {}", self.path.display(), e);
                self.state = PlaybackState::Stopped;
                self.events.push_back(PlaybackEvent::Error {
                    what: MEDIA_ERROR_UNKNOWN,
                    extra: MEDIA_ERROR_IO,
                });
            }
            return;
        }

        self.state = PlaybackState::Stopped;
        self.events.push_back(PlaybackEvent::Completed);
    }
}

impl NativePlayer for RodioPlayer {
    fn prepare(&mut self) -> Result<(), SoundError> {
        self.ensure_live()?;
        let source = Self::decode(&self.path)?;
        self.duration_ms = source
            .total_duration()
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64;

        self.sink = Some(self.connect(source));
        self.looping.clear_wraps();
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    fn start(&mut self) -> Result<(), SoundError> {
        self.ensure_live()?;
        if self.drained() {
            // Finished or never prepared: start over from the top
            self.load(0, true)?;
            return Ok(());
        }
        if let Some(ref sink) = self.sink {
            sink.play();
        }
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), SoundError> {
        self.ensure_live()?;
        if let Some(ref sink) = self.sink {
            sink.pause();
        }
        self.state = PlaybackState::Paused;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: u64) -> Result<(), SoundError> {
        self.ensure_live()?;
        let position_ms = if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        };

        let was_playing = self.state == PlaybackState::Playing;
        if self.drained() || position_ms < self.position_ms() {
            self.load(position_ms, was_playing)?;
        } else {
            self.seek_forward(position_ms)?;
        }
        Ok(())
    }

    fn position_ms(&self) -> u64 {
        let Some(ref sink) = self.sink else {
            return 0;
        };
        let elapsed = sink.get_pos().as_millis() as u64;
        if self.duration_ms == 0 {
            return elapsed;
        }
        // The sink keeps counting across loop wraps
        let wrapped = u64::from(self.looping.wraps()) * self.duration_ms;
        elapsed.saturating_sub(wrapped).min(self.duration_ms)
    }

    fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing && (self.looping.enabled() || !self.drained())
    }

    fn set_volume(&mut self, left: f32, right: f32) {
        self.gains.set(left.clamp(0.0, 1.0), right.clamp(0.0, 1.0));
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping.set_enabled(looping);
    }

    fn is_looping(&self) -> bool {
        self.looping.enabled()
    }

    fn stop(&mut self) -> Result<(), SoundError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.state = PlaybackState::Stopped;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SoundError> {
        self.stop()?;
        self.events.clear();
        self.duration_ms = 0;
        self.looping.set_enabled(false);
        Ok(())
    }

    fn release(&mut self) -> Result<(), SoundError> {
        self.reset()?;
        self.released = true;
        Ok(())
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        if !self.released {
            self.check_finished();
        }
        self.events.pop_front()
    }
}
