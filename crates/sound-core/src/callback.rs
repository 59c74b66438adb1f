//! One-shot play callbacks.
//!
//! A `PlayCallback` is consumed by `fire`, so it can run at most once.
//! Dropping it unfired is how "never fires" is expressed (already playing,
//! looping, released before completion).

use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

/// A fired callback and its result, queued for a notifier thread.
pub type Notification = (PlayCallback, bool);

pub struct PlayCallback {
    func: Box<dyn FnOnce(bool) + Send>,
}

impl PlayCallback {
    pub fn new<F>(func: F) -> Self
    where
        F: FnOnce(bool) + Send + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }

    /// Callback paired with a receiver that observes its fate.
    pub fn channel() -> (Self, PlayResult) {
        let (tx, rx) = mpsc::channel();
        let callback = Self::new(move |success| {
            let _ = tx.send(success);
        });
        (
            callback,
            PlayResult {
                rx,
                status: CallbackStatus::Pending,
            },
        )
    }

    pub fn fire(self, success: bool) {
        (self.func)(success)
    }
}

impl fmt::Debug for PlayCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayCallback").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackStatus {
    /// Still held by the registry.
    Pending,
    /// Fired with the given success flag.
    Fired(bool),
    /// Dropped without firing; it never will.
    Dropped,
}

/// Receiving half of `PlayCallback::channel`.
#[derive(Debug)]
pub struct PlayResult {
    rx: Receiver<bool>,
    status: CallbackStatus,
}

impl PlayResult {
    pub fn status(&mut self) -> CallbackStatus {
        if self.status == CallbackStatus::Pending {
            self.status = match self.rx.try_recv() {
                Ok(success) => CallbackStatus::Fired(success),
                Err(TryRecvError::Empty) => CallbackStatus::Pending,
                Err(TryRecvError::Disconnected) => CallbackStatus::Dropped,
            };
        }
        self.status
    }

    /// Block until the callback fires or is dropped, or the timeout passes.
    pub fn wait(&mut self, timeout: Duration) -> CallbackStatus {
        if self.status == CallbackStatus::Pending {
            self.status = match self.rx.recv_timeout(timeout) {
                Ok(success) => CallbackStatus::Fired(success),
                Err(mpsc::RecvTimeoutError::Timeout) => CallbackStatus::Pending,
                Err(mpsc::RecvTimeoutError::Disconnected) => CallbackStatus::Dropped,
            };
        }
        self.status
    }
}
