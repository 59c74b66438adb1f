use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returned by a successful `prepare`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrepareInfo {
    /// Duration in seconds.
    pub duration: f64,
}

/// Position report for `getCurrentTime`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTime {
    /// Position in seconds, `-1.0` when the key holds no player.
    pub position: f64,
    pub is_playing: bool,
}

impl CurrentTime {
    pub const ABSENT: CurrentTime = CurrentTime {
        position: -1.0,
        is_playing: false,
    };

    pub fn from_millis(position_ms: u64, is_playing: bool) -> Self {
        Self {
            position: position_ms as f64 * 0.001,
            is_playing,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.position < 0.0
    }
}

/// Error object handed to the host in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i32,
    pub message: String,
}

/// What a call to `play` did with its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayOutcome {
    /// No player under the key; the callback already fired with `false`.
    Absent,
    /// The player was already running; the callback was dropped unfired.
    AlreadyPlaying,
    /// Playback started; the callback is pending on completion or error.
    Started,
    /// The native start call failed; the callback already fired with `false`.
    StartFailed,
}

/// Capability constant identifying the platform this build runs on.
pub fn platform_identifier() -> &'static str {
    if cfg!(target_os = "android") {
        "IsAndroid"
    } else if cfg!(target_os = "ios") {
        "IsIOS"
    } else if cfg!(target_os = "macos") {
        "IsMacOS"
    } else if cfg!(target_os = "windows") {
        "IsWindows"
    } else if cfg!(target_os = "linux") {
        "IsLinux"
    } else {
        "IsUnknown"
    }
}

/// Constants exported to the host on module registration.
pub fn constants() -> BTreeMap<String, bool> {
    let mut constants = BTreeMap::new();
    constants.insert(platform_identifier().to_string(), true);
    constants
}
