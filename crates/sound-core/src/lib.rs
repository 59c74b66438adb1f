//! sound-core: Core library for the sound bridge
//!
//! This crate holds the integer-keyed player registry and the traits a
//! native audio backend implements. It has no audio device dependency.
//!
//! # Architecture
//!
//! The crate is organized as follows:
//! - `registry`: `SoundRegistry`, the key -> player table and its operations
//! - `backend`: `AudioBackend` / `NativePlayer` traits and playback events
//! - `callback`: one-shot play callbacks
//! - `resolve`: bundled-resource and filesystem source resolution
//! - `types`: payloads handed to the host
//! - `mock`: scriptable backend for tests (feature `mock`)
//!
//! # Usage
//!
//! ```ignore
//! use sound_core::{PlayCallback, SoundRegistry};
//!
//! let mut registry = SoundRegistry::new(backend);
//! let info = registry.prepare("beep", 1)?;
//! registry.play(1, PlayCallback::new(|ok| println!("finished: {}", ok)));
//! ```

pub mod backend;
pub mod callback;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod registry;
pub mod resolve;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use backend::{AudioBackend, NativePlayer, PlaybackEvent, ResolvedSource};
pub use callback::{CallbackStatus, Notification, PlayCallback, PlayResult};
pub use error::{SoundError, TeardownError};
pub use registry::{SoundRegistry, seconds_to_millis};
pub use resolve::SourceResolver;
pub use types::{CurrentTime, ErrorPayload, PlayOutcome, PrepareInfo};


#[cfg(test)]
#[path = "registry_props_test.rs"]
mod registry_props_test;
