//! Gapless looping inside the source chain.
//!
//! The sink never sees the end of a looping source: when the decoder runs
//! dry it is rewound in place, so there is no silent gap waiting for the
//! next poll to reload the file.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use rodio::Source;
use rodio::source::SeekError;

/// Loop flag plus the number of times the live source has wrapped.
#[derive(Debug, Default)]
pub struct LoopState {
    enabled: AtomicBool,
    wraps: AtomicU32,
}

impl LoopState {
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Wraps since the source was last loaded or seeked.
    pub fn wraps(&self) -> u32 {
        self.wraps.load(Ordering::Acquire)
    }

    pub fn clear_wraps(&self) {
        self.wraps.store(0, Ordering::Release);
    }
}

pub struct Looping<S> {
    inner: S,
    state: Arc<LoopState>,
}

impl<S: Source> Looping<S> {
    pub fn new(inner: S, state: Arc<LoopState>) -> Self {
        Self { inner, state }
    }
}

impl<S: Source> Iterator for Looping<S> {
    type Item = rodio::Sample;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(sample) = self.inner.next() {
            return Some(sample);
        }
        if !self.state.enabled() {
            return None;
        }
        // An unseekable source just ends; the player reloads it on the next poll
        if self.inner.try_seek(Duration::ZERO).is_err() {
            return None;
        }
        self.state.wraps.fetch_add(1, Ordering::AcqRel);
        self.inner.next()
    }
}

impl<S: Source> Source for Looping<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> rodio::ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> rodio::SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.inner.try_seek(pos)?;
        self.state.clear_wraps();
        Ok(())
    }
}
