use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Runtime configuration for the sound module
///
/// Read from environment variables; anything unset or unparsable keeps
/// its default.
#[derive(Debug, Clone)]
pub struct SoundConfig {
    /// Directory searched for bundled resources (`SOUND_RESOURCE_DIR`)
    pub resource_dir: Option<PathBuf>,
    /// How often the audio thread checks players for completion
    /// (`SOUND_POLL_INTERVAL_MS`)
    pub poll_interval: Duration,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            resource_dir: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl SoundConfig {
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("SOUND_RESOURCE_DIR").filter(|d| !d.is_empty()) {
            config.resource_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup("SOUND_POLL_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => warn!(
                    "Ignoring SOUND_POLL_INTERVAL_MS={:?}, using {}ms",
                    raw, DEFAULT_POLL_INTERVAL_MS
                ),
            }
        }

        config
    }

    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = SoundConfig::from_lookup(lookup(&[]));
        assert!(config.resource_dir.is_none());
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_reads_env_values() {
        let config = SoundConfig::from_lookup(lookup(&[
            ("SOUND_RESOURCE_DIR", "/opt/app/raw"),
            ("SOUND_POLL_INTERVAL_MS", "25"),
        ]));
        assert_eq!(config.resource_dir, Some(PathBuf::from("/opt/app/raw")));
        assert_eq!(config.poll_interval, Duration::from_millis(25));
    }

    #[test]
    fn test_invalid_interval_falls_back() {
        for raw in ["0", "soon", "-5"] {
            let config = SoundConfig::from_lookup(lookup(&[("SOUND_POLL_INTERVAL_MS", raw)]));
            assert_eq!(config.poll_interval, Duration::from_millis(100));
        }
    }

    #[test]
    fn test_empty_resource_dir_is_unset() {
        let config = SoundConfig::from_lookup(lookup(&[("SOUND_RESOURCE_DIR", "")]));
        assert!(config.resource_dir.is_none());
    }
}
