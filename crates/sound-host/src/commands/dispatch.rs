//! Method-name entry point for the host bridge.
//!
//! Arguments arrive as JSON values; answers go back through a single-use
//! host callback taking positional values:
//! - `prepare`: `[error]` or `[null, {"duration": seconds}]`
//! - `play`: `[success]`
//! - `getCurrentTime`: `[position, isPlaying]`

use crate::commands::{BridgeError, SoundModule};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sound_core::PlayCallback;

pub type HostCallback = Box<dyn FnOnce(Vec<Value>) + Send>;

impl SoundModule {
    pub fn dispatch(
        &self,
        method: &str,
        args: &[Value],
        callback: Option<HostCallback>,
    ) -> Result<(), BridgeError> {
        match method {
            "prepare" => {
                let source: String = arg(method, args, 0)?;
                let key = key_arg(method, args, 1)?;
                let callback = require_callback(method, callback)?;
                match self.prepare(&source, key) {
                    Ok(info) => callback(vec![Value::Null, json!(info)]),
                    Err(BridgeError::Sound(e)) => callback(vec![json!(e.to_payload())]),
                    Err(e) => return Err(e),
                }
            }
            "play" => {
                let key = key_arg(method, args, 0)?;
                let callback = require_callback(method, callback)?;
                let callback = PlayCallback::new(move |success| callback(vec![Value::Bool(success)]));
                self.play(key, callback)?;
            }
            "pause" => self.pause(key_arg(method, args, 0)?)?,
            "stop" => self.stop(key_arg(method, args, 0)?)?,
            "release" => self.release(key_arg(method, args, 0)?)?,
            "setVolume" => {
                let key = key_arg(method, args, 0)?;
                let left: f32 = arg(method, args, 1)?;
                let right: f32 = arg(method, args, 2)?;
                self.set_volume(key, left, right)?;
            }
            "setLooping" => {
                let key = key_arg(method, args, 0)?;
                let looping: bool = arg(method, args, 1)?;
                self.set_looping(key, looping)?;
            }
            "setCurrentTime" => {
                let key = key_arg(method, args, 0)?;
                let seconds: f64 = arg(method, args, 1)?;
                if let Err(e) = self.set_current_time(key, seconds) {
                    // seeking has no error path on the host side
                    warn!("setCurrentTime({}, {}) failed: {}", key, seconds, e);
                }
            }
            "getCurrentTime" => {
                let key = key_arg(method, args, 0)?;
                let callback = require_callback(method, callback)?;
                let time = self.get_current_time(key)?;
                callback(vec![json!(time.position), json!(time.is_playing)]);
            }
            "enable" => {
                let enabled: bool = arg(method, args, 0)?;
                self.enable(enabled)?;
            }
            other => return Err(BridgeError::UnknownMethod(other.to_string())),
        }
        Ok(())
    }
}

fn invalid(method: &str, reason: impl Into<String>) -> BridgeError {
    BridgeError::InvalidArguments {
        method: method.to_string(),
        reason: reason.into(),
    }
}

fn arg<T: DeserializeOwned>(method: &str, args: &[Value], index: usize) -> Result<T, BridgeError> {
    let value = args
        .get(index)
        .ok_or_else(|| invalid(method, format!("missing argument {}", index)))?;
    serde_json::from_value(value.clone())
        .map_err(|e| invalid(method, format!("argument {}: {}", index, e)))
}

/// Keys may arrive as floats from hosts that only have one number type.
fn key_arg(method: &str, args: &[Value], index: usize) -> Result<i32, BridgeError> {
    let value = args
        .get(index)
        .ok_or_else(|| invalid(method, format!("missing argument {}", index)))?;

    let key = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    };

    key.and_then(|k| i32::try_from(k).ok())
        .ok_or_else(|| invalid(method, format!("argument {} is not an integer key", index)))
}

fn require_callback(
    method: &str,
    callback: Option<HostCallback>,
) -> Result<HostCallback, BridgeError> {
    callback.ok_or_else(|| BridgeError::MissingCallback(method.to_string()))
}
