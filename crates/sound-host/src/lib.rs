//! sound-host: native audio players keyed by integer handles
//!
//! Wires the `sound-core` registry to a rodio output device and exposes it
//! to a host application through `SoundModule`, either with typed methods
//! or by method name via `SoundModule::dispatch`.

pub mod audio;
pub mod commands;
pub mod config;

pub use commands::{BridgeError, HostCallback, MODULE_NAME, SoundModule};
pub use config::SoundConfig;
