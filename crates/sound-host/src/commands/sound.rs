use crate::audio::RodioBackend;
use crate::commands::BridgeError;
use crate::config::SoundConfig;
use log::{debug, error};
use parking_lot::Mutex;
use sound_core::{
    AudioBackend, CurrentTime, Notification, PlayCallback, PlayOutcome, PrepareInfo, SoundError,
    SoundRegistry, SourceResolver, TeardownError, types,
};
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Name the host registers this module under.
pub const MODULE_NAME: &str = "Sound";

enum SoundCommand {
    Prepare(String, i32, Sender<Result<PrepareInfo, SoundError>>),
    Play(i32, PlayCallback, Sender<PlayOutcome>),
    Pause(i32, Sender<()>),
    Stop(i32, Sender<()>),
    Release(i32, Sender<Result<(), SoundError>>),
    SetVolume(i32, f32, f32, Sender<()>),
    SetLooping(i32, bool, Sender<()>),
    SetCurrentTime(i32, f64, Sender<Result<(), SoundError>>),
    GetCurrentTime(i32, Sender<CurrentTime>),
    Enable(bool, Sender<()>),
    Shutdown(Sender<Result<(), TeardownError>>),
}

/// Host-facing handle to the audio thread.
///
/// The registry lives on its own thread; every call is a message with a
/// reply channel, so operations on the same key never interleave.
///
/// Play callbacks run on a separate notifier thread, so a callback may
/// call back into the module.
pub struct SoundModule {
    sender: Sender<SoundCommand>,
    thread: Mutex<Option<JoinHandle<()>>>,
    notifier: Mutex<Option<JoinHandle<()>>>,
}

impl SoundModule {
    /// Start the module on the default output device.
    pub fn new(config: SoundConfig) -> Result<Self, BridgeError> {
        let resolver = SourceResolver::new(config.resource_dir.clone());
        Self::spawn(config, move || RodioBackend::new(resolver))
    }

    /// Start the module with any backend. The backend is built on the
    /// audio thread and never leaves it.
    pub fn spawn<B, F>(config: SoundConfig, make_backend: F) -> Result<Self, BridgeError>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> Result<B, SoundError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<SoundCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), SoundError>>();
        let (notify_tx, notify_rx) = mpsc::channel::<Notification>();
        let poll_interval = config.poll_interval;

        // Ends once the registry, and with it the sender, is dropped
        let notifier = thread::Builder::new()
            .name("sound-notify".to_string())
            .spawn(move || notify_thread(notify_rx))
            .map_err(|e| BridgeError::Spawn(e.to_string()))?;

        let handle = thread::Builder::new()
            .name("sound-audio".to_string())
            .spawn(move || {
                let backend = match make_backend() {
                    Ok(backend) => backend,
                    Err(e) => {
                        error!("Failed to create audio backend: {}", e);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                let registry = SoundRegistry::with_notifier(backend, notify_tx);
                audio_thread(registry, rx, poll_interval);
            })
            .map_err(|e| BridgeError::Spawn(e.to_string()))?;

        let ready = ready_rx.recv().map_err(|_| BridgeError::ChannelClosed)?;
        if let Err(e) = ready {
            let _ = handle.join();
            let _ = notifier.join();
            return Err(e.into());
        }

        Ok(Self {
            sender: tx,
            thread: Mutex::new(Some(handle)),
            notifier: Mutex::new(Some(notifier)),
        })
    }

    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn request<T>(&self, build: impl FnOnce(Sender<T>) -> SoundCommand) -> Result<T, BridgeError> {
        let (tx, rx) = mpsc::channel();
        self.sender
            .send(build(tx))
            .map_err(|_| BridgeError::ChannelClosed)?;
        rx.recv().map_err(|_| BridgeError::ChannelClosed)
    }

    pub fn prepare(&self, source: &str, key: i32) -> Result<PrepareInfo, BridgeError> {
        let source = source.to_string();
        Ok(self.request(|tx| SoundCommand::Prepare(source, key, tx))??)
    }

    pub fn play(&self, key: i32, callback: PlayCallback) -> Result<PlayOutcome, BridgeError> {
        self.request(|tx| SoundCommand::Play(key, callback, tx))
    }

    pub fn pause(&self, key: i32) -> Result<(), BridgeError> {
        self.request(|tx| SoundCommand::Pause(key, tx))
    }

    pub fn stop(&self, key: i32) -> Result<(), BridgeError> {
        self.request(|tx| SoundCommand::Stop(key, tx))
    }

    pub fn release(&self, key: i32) -> Result<(), BridgeError> {
        Ok(self.request(|tx| SoundCommand::Release(key, tx))??)
    }

    pub fn set_volume(&self, key: i32, left: f32, right: f32) -> Result<(), BridgeError> {
        self.request(|tx| SoundCommand::SetVolume(key, left, right, tx))
    }

    pub fn set_looping(&self, key: i32, looping: bool) -> Result<(), BridgeError> {
        self.request(|tx| SoundCommand::SetLooping(key, looping, tx))
    }

    pub fn set_current_time(&self, key: i32, seconds: f64) -> Result<(), BridgeError> {
        Ok(self.request(|tx| SoundCommand::SetCurrentTime(key, seconds, tx))??)
    }

    pub fn get_current_time(&self, key: i32) -> Result<CurrentTime, BridgeError> {
        self.request(|tx| SoundCommand::GetCurrentTime(key, tx))
    }

    pub fn enable(&self, enabled: bool) -> Result<(), BridgeError> {
        self.request(|tx| SoundCommand::Enable(enabled, tx))
    }

    pub fn constants(&self) -> BTreeMap<String, bool> {
        types::constants()
    }

    /// Tear down every player and stop both threads.
    ///
    /// Later calls on this module fail with `ChannelClosed`. Callbacks
    /// already handed to the notifier still run before this returns, unless
    /// it is called from one of those callbacks.
    pub fn shutdown(&self) -> Result<(), BridgeError> {
        let result = self.request(SoundCommand::Shutdown);
        let audio = self.thread.lock().take();
        if let Some(handle) = audio {
            let _ = handle.join();
        }
        let notifier = self.notifier.lock().take();
        if let Some(handle) = notifier {
            // A callback can't wait for its own thread to finish
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
        Ok(result??)
    }
}

impl Drop for SoundModule {
    fn drop(&mut self) {
        if self.thread.lock().is_none() {
            return;
        }
        if let Err(e) = self.shutdown() {
            error!("Sound module shut down with errors: {}", e);
        }
    }
}

fn audio_thread<B: AudioBackend>(
    mut registry: SoundRegistry<B>,
    rx: Receiver<SoundCommand>,
    poll_interval: Duration,
) {
    debug!("Audio thread started");

    loop {
        match rx.recv_timeout(poll_interval) {
            Ok(SoundCommand::Shutdown(reply)) => {
                let _ = reply.send(registry.shutdown());
                break;
            }
            Ok(cmd) => handle_command(&mut registry, cmd),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                if let Err(e) = registry.shutdown() {
                    error!("Audio thread closed with errors: {}", e);
                }
                break;
            }
        }

        registry.pump();
    }

    debug!("Audio thread stopped");
}

fn notify_thread(rx: Receiver<Notification>) {
    for (callback, success) in rx {
        callback.fire(success);
    }
    debug!("Notifier thread stopped");
}

fn handle_command<B: AudioBackend>(registry: &mut SoundRegistry<B>, cmd: SoundCommand) {
    match cmd {
        SoundCommand::Prepare(source, key, reply) => {
            let _ = reply.send(registry.prepare(&source, key));
        }
        SoundCommand::Play(key, callback, reply) => {
            let _ = reply.send(registry.play(key, callback));
        }
        SoundCommand::Pause(key, reply) => {
            registry.pause(key);
            let _ = reply.send(());
        }
        SoundCommand::Stop(key, reply) => {
            registry.stop(key);
            let _ = reply.send(());
        }
        SoundCommand::Release(key, reply) => {
            let _ = reply.send(registry.release(key));
        }
        SoundCommand::SetVolume(key, left, right, reply) => {
            registry.set_volume(key, left, right);
            let _ = reply.send(());
        }
        SoundCommand::SetLooping(key, looping, reply) => {
            registry.set_looping(key, looping);
            let _ = reply.send(());
        }
        SoundCommand::SetCurrentTime(key, seconds, reply) => {
            let _ = reply.send(registry.set_current_time(key, seconds));
        }
        SoundCommand::GetCurrentTime(key, reply) => {
            let _ = reply.send(registry.get_current_time(key));
        }
        SoundCommand::Enable(enabled, reply) => {
            registry.enable(enabled);
            let _ = reply.send(());
        }
        SoundCommand::Shutdown(reply) => {
            let _ = reply.send(registry.shutdown());
        }
    }
}
