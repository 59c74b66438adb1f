//! Per-channel gain applied inside the source chain.
//!
//! `Sink::set_volume` only knows one level; left/right balance has to be
//! applied to the samples themselves.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use rodio::Source;
use rodio::source::SeekError;

/// Left/right gains shared between a player and its live source.
#[derive(Debug)]
pub struct StereoGains {
    left: AtomicU32,
    right: AtomicU32,
}

impl StereoGains {
    pub fn new(left: f32, right: f32) -> Self {
        Self {
            left: AtomicU32::new(left.to_bits()),
            right: AtomicU32::new(right.to_bits()),
        }
    }

    pub fn set(&self, left: f32, right: f32) {
        self.left.store(left.to_bits(), Ordering::Relaxed);
        self.right.store(right.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> (f32, f32) {
        (
            f32::from_bits(self.left.load(Ordering::Relaxed)),
            f32::from_bits(self.right.load(Ordering::Relaxed)),
        )
    }
}

impl Default for StereoGains {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Scales channel 0 by the left gain and channel 1 by the right gain.
/// Mono sources take the left gain; channels past the second are untouched.
pub struct StereoGain<S> {
    inner: S,
    gains: Arc<StereoGains>,
    channel: u16,
}

impl<S: Source> StereoGain<S> {
    pub fn new(inner: S, gains: Arc<StereoGains>) -> Self {
        Self {
            inner,
            gains,
            channel: 0,
        }
    }
}

impl<S: Source> Iterator for StereoGain<S> {
    type Item = rodio::Sample;

    fn next(&mut self) -> Option<Self::Item> {
        let channels = self.inner.channels().max(1);
        if self.channel >= channels {
            self.channel = 0;
        }

        let sample = self.inner.next()?;
        let (left, right) = self.gains.get();
        let gain = match self.channel {
            0 => left,
            1 => right,
            _ => 1.0,
        };

        self.channel = (self.channel + 1) % channels;
        Some(sample * gain)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for StereoGain<S> {
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
        self.channel = 0;
        Ok(())
    }
}
