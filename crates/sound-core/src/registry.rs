//! Handle-indexed lifecycle management of native players.

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{SendError, Sender};

use log::{debug, error, warn};

use crate::backend::{AudioBackend, NativePlayer, PlaybackEvent};
use crate::callback::{Notification, PlayCallback};
use crate::error::{SoundError, TeardownError};
use crate::types::{self, CurrentTime, PlayOutcome, PrepareInfo};

struct Entry<P> {
    player: P,
    /// Token of the `play` call that last started playback.
    pending: Option<PlayCallback>,
}

/// Integer-keyed table of prepared players.
///
/// All methods take `&mut self`; callers that share a registry across
/// threads serialize access (see `SoundModule` in sound-host).
///
/// Callbacks run inline unless a notifier channel is attached, in which
/// case they are sent there and run by whoever drains it.
pub struct SoundRegistry<B: AudioBackend> {
    backend: B,
    players: HashMap<i32, Entry<B::Player>>,
    notifier: Option<Sender<Notification>>,
}

impl<B: AudioBackend> SoundRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            players: HashMap::new(),
            notifier: None,
        }
    }

    /// Registry whose callbacks are handed to `notifier` instead of
    /// running on the caller's thread.
    pub fn with_notifier(backend: B, notifier: Sender<Notification>) -> Self {
        Self {
            backend,
            players: HashMap::new(),
            notifier: Some(notifier),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn prepare(&mut self, source: &str, key: i32) -> Result<PrepareInfo, SoundError> {
        if self.players.contains_key(&key) {
            return Err(SoundError::KeyInUse(key));
        }

        let resolved = self
            .backend
            .resolve(source)
            .ok_or_else(|| SoundError::ResourceNotFound(source.to_string()))?;

        let mut player =
            self.backend
                .open(&resolved)
                .map_err(|e| SoundError::PrepareFailed {
                    key,
                    reason: e.to_string(),
                })?;

        if let Err(e) = player.prepare() {
            if let Err(release_err) = player.release() {
                warn!("Failed to release unprepared player {}: {}", key, release_err);
            }
            return Err(SoundError::PrepareFailed {
                key,
                reason: e.to_string(),
            });
        }

        let duration_ms = player.duration_ms();
        self.players.insert(
            key,
            Entry {
                player,
                pending: None,
            },
        );
        debug!(
            "Prepared player {} from {} ({}ms)",
            key,
            resolved.path().display(),
            duration_ms
        );

        Ok(PrepareInfo {
            duration: duration_ms as f64 * 0.001,
        })
    }

    pub fn play(&mut self, key: i32, callback: PlayCallback) -> PlayOutcome {
        let Some(entry) = self.players.get_mut(&key) else {
            deliver(&self.notifier, callback, false);
            return PlayOutcome::Absent;
        };

        if entry.player.is_playing() {
            return PlayOutcome::AlreadyPlaying;
        }

        // Anything the player raised before this call belongs to the old token
        Self::drain_events(key, entry, &self.notifier);
        entry.pending = Some(callback);

        match entry.player.start() {
            Ok(()) => {
                debug!("Started player {}", key);
                PlayOutcome::Started
            }
            Err(e) => {
                warn!("Failed to start player {}: {}", key, e);
                if let Some(callback) = entry.pending.take() {
                    deliver(&self.notifier, callback, false);
                }
                PlayOutcome::StartFailed
            }
        }
    }

    pub fn pause(&mut self, key: i32) {
        if let Some(entry) = self.players.get_mut(&key) {
            if entry.player.is_playing() {
                if let Err(e) = entry.player.pause() {
                    warn!("Failed to pause player {}: {}", key, e);
                }
            }
        }
    }

    pub fn stop(&mut self, key: i32) {
        if let Some(entry) = self.players.get_mut(&key) {
            if entry.player.is_playing() {
                if let Err(e) = entry.player.pause() {
                    warn!("Failed to pause player {}: {}", key, e);
                }
                if let Err(e) = entry.player.seek_to(0) {
                    warn!("Failed to rewind player {}: {}", key, e);
                }
            }
        }
    }

    /// Release the player under `key`. The entry is gone afterwards even
    /// when the native release reports a failure.
    pub fn release(&mut self, key: i32) -> Result<(), SoundError> {
        let Some(mut entry) = self.players.remove(&key) else {
            return Ok(());
        };
        entry.pending = None;
        debug!("Releasing player {}", key);
        entry.player.release()
    }

    pub fn set_volume(&mut self, key: i32, left: f32, right: f32) {
        if let Some(entry) = self.players.get_mut(&key) {
            entry.player.set_volume(left, right);
        }
    }

    pub fn set_looping(&mut self, key: i32, looping: bool) {
        if let Some(entry) = self.players.get_mut(&key) {
            entry.player.set_looping(looping);
        }
    }

    pub fn set_current_time(&mut self, key: i32, seconds: f64) -> Result<(), SoundError> {
        match self.players.get_mut(&key) {
            Some(entry) => entry.player.seek_to(seconds_to_millis(seconds)),
            None => Ok(()),
        }
    }

    pub fn get_current_time(&self, key: i32) -> CurrentTime {
        match self.players.get(&key) {
            Some(entry) => {
                CurrentTime::from_millis(entry.player.position_ms(), entry.player.is_playing())
            }
            None => CurrentTime::ABSENT,
        }
    }

    /// Reserved by the host API; has no effect.
    pub fn enable(&mut self, enabled: bool) {
        debug!("enable({}) ignored", enabled);
    }

    pub fn constants(&self) -> BTreeMap<String, bool> {
        types::constants()
    }

    /// Relay every pending native event to its play callback.
    ///
    /// Returns the number of callbacks fired or handed to the notifier.
    pub fn pump(&mut self) -> usize {
        let notifier = &self.notifier;
        self.players
            .iter_mut()
            .map(|(key, entry)| Self::drain_events(*key, entry, notifier))
            .sum()
    }

    fn drain_events(
        key: i32,
        entry: &mut Entry<B::Player>,
        notifier: &Option<Sender<Notification>>,
    ) -> usize {
        let mut fired = 0;
        while let Some(event) = entry.player.poll_event() {
            match event {
                PlaybackEvent::Completed => {
                    if entry.player.is_looping() {
                        continue;
                    }
                    if let Some(callback) = entry.pending.take() {
                        debug!("Player {} completed", key);
                        deliver(notifier, callback, true);
                        fired += 1;
                    }
                }
                PlaybackEvent::Error { what, extra } => {
                    warn!("Player {} failed (what={}, extra={})", key, what, extra);
                    if let Some(callback) = entry.pending.take() {
                        deliver(notifier, callback, false);
                        fired += 1;
                    }
                }
            }
        }
        fired
    }

    /// Close every player, continuing past failures.
    ///
    /// Pending callbacks are dropped unfired. The registry is empty
    /// afterwards whatever the outcome.
    pub fn shutdown(&mut self) -> Result<(), TeardownError> {
        let mut keys: Vec<i32> = self.players.keys().copied().collect();
        keys.sort_unstable();

        let mut failures = Vec::new();
        for key in keys {
            let Some(mut entry) = self.players.remove(&key) else {
                continue;
            };
            entry.pending = None;
            while entry.player.poll_event().is_some() {}

            if let Err(e) = close_player(&mut entry.player) {
                error!("Failed to close player {} during shutdown: {}", key, e);
                failures.push((key, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(TeardownError { failures })
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, key: i32) -> bool {
        self.players.contains_key(&key)
    }

    /// Live keys in ascending order.
    pub fn keys(&self) -> Vec<i32> {
        let mut keys: Vec<i32> = self.players.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn has_pending_callback(&self, key: i32) -> bool {
        self.players
            .get(&key)
            .is_some_and(|entry| entry.pending.is_some())
    }
}

impl<B: AudioBackend> Drop for SoundRegistry<B> {
    fn drop(&mut self) {
        if self.players.is_empty() {
            return;
        }
        if let Err(e) = self.shutdown() {
            error!("Registry dropped with unclosed players: {}", e);
        }
    }
}

fn deliver(notifier: &Option<Sender<Notification>>, callback: PlayCallback, success: bool) {
    match notifier {
        Some(tx) => {
            if let Err(SendError((callback, success))) = tx.send((callback, success)) {
                warn!("Notifier gone, running play callback inline");
                callback.fire(success);
            }
        }
        None => callback.fire(success),
    }
}

/// Stop, reset and release, attempting every step. The first failure wins.
fn close_player<P: NativePlayer>(player: &mut P) -> Result<(), SoundError> {
    let mut first_err = None;

    if player.is_playing() {
        if let Err(e) = player.stop() {
            first_err.get_or_insert(e);
        }
    }
    if let Err(e) = player.reset() {
        first_err.get_or_insert(e);
    }
    if let Err(e) = player.release() {
        first_err.get_or_insert(e);
    }

    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Fractional seconds to native milliseconds, rounded; negatives clamp to 0.
pub fn seconds_to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}
