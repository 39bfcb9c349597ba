//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session length and auto-repeat policy
//! - Sound cue settings
//! - Event endpoint, optional API key and user id
//!
//! Configuration is stored at `~/.config/pomobar/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{SessionLength, TimerSettings};

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// One of 15, 20, 25, 30, 50.
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default = "default_true")]
    pub auto_repeat: bool,
}

/// Sound cue configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 0.0 ..= 1.0
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Directory holding `start`, `pause`, `stop`, `complete` sounds.
    /// Defaults to `<data dir>/sounds`.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Event endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_endpoint_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomobar/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
}

// Default functions
fn default_duration_minutes() -> u32 {
    25
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f64 {
    1.0
}
fn default_endpoint_url() -> String {
    "http://127.0.0.1:3000/pomodoro".into()
}
fn default_api_key_header() -> String {
    "x-api-key".into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration_minutes(),
            auto_repeat: true,
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
            directory: None,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_endpoint_url(),
            api_key: None,
            api_key_header: default_api_key_header(),
            user_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EndpointConfig {
    /// Parsed endpoint URL; only `http` and `https` are accepted.
    pub fn url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url)
            .map_err(|e| ConfigError::invalid("endpoint.url", format!("'{}': {e}", self.url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::invalid(
                "endpoint.url",
                format!("unsupported scheme '{other}'"),
            )),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let parse_err = |what: &str| ConfigError::invalid(key, format!("cannot parse '{value}' as {what}"));
                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|_| parse_err("bool"))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| parse_err("number"))?
                        } else {
                            return Err(parse_err("number"));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|_| parse_err("JSON"))?
                    }
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the configuration file.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Persist to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_err = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_err(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_err(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_err(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key.
    ///
    /// The new value is type-checked against the existing one and the whole
    /// configuration is validated before it replaces `self`; on error `self`
    /// is unchanged. Does not save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)
            .map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the timer or delivery layer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session_length()?;
        if !(0.0..=1.0).contains(&self.sound.volume) {
            return Err(ConfigError::invalid(
                "sound.volume",
                format!("{} is outside 0.0..=1.0", self.sound.volume),
            ));
        }
        self.endpoint.url()?;
        if self.endpoint.timeout_secs == 0 {
            return Err(ConfigError::invalid("endpoint.timeout_secs", "must be at least 1"));
        }
        if self.endpoint.api_key_header.trim().is_empty() {
            return Err(ConfigError::invalid("endpoint.api_key_header", "must not be empty"));
        }
        Ok(())
    }

    pub fn session_length(&self) -> Result<SessionLength, ConfigError> {
        SessionLength::try_from(self.timer.duration_minutes)
    }

    /// Timer settings derived from this configuration.
    pub fn timer_settings(&self) -> Result<TimerSettings, ConfigError> {
        Ok(TimerSettings {
            length: self.session_length()?,
            auto_repeat: self.timer.auto_repeat,
            sound_enabled: self.sound.enabled,
            sound_volume: self.sound.volume as f32,
            user_id: self.endpoint.user_id.clone().filter(|id| !id.is_empty()),
        })
    }

    /// Directory searched for cue sounds.
    pub fn sounds_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.sound.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join("sounds")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.timer.duration_minutes, 25);
        assert!(cfg.timer.auto_repeat);
        assert!(cfg.sound.enabled);
        assert_eq!(cfg.sound.volume, 1.0);
        assert!(cfg.endpoint.enabled);
        assert_eq!(cfg.endpoint.url, "http://127.0.0.1:3000/pomodoro");
        assert_eq!(cfg.endpoint.api_key, None);
        assert_eq!(cfg.endpoint.api_key_header, "x-api-key");
        assert_eq!(cfg.endpoint.timeout_secs, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[timer]\nduration_minutes = 50\n").unwrap();
        assert_eq!(cfg.timer.duration_minutes, 50);
        assert!(cfg.timer.auto_repeat);
        assert_eq!(cfg.endpoint, EndpointConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.duration_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("timer.auto_repeat").as_deref(), Some("true"));
        assert_eq!(
            cfg.get("endpoint.url").as_deref(),
            Some("http://127.0.0.1:3000/pomodoro")
        );
        assert_eq!(cfg.get("endpoint.api_key").as_deref(), Some("null"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("timer.auto_repeat", "false").unwrap();
        cfg.set("timer.duration_minutes", "15").unwrap();
        cfg.set("sound.volume", "0.35").unwrap();
        cfg.set("endpoint.api_key", "supersecret").unwrap();
        cfg.set("endpoint.url", "https://example.com/api/v1/pomodoro").unwrap();

        assert!(!cfg.timer.auto_repeat);
        assert_eq!(cfg.timer.duration_minutes, 15);
        assert_eq!(cfg.sound.volume, 0.35);
        assert_eq!(cfg.endpoint.api_key.as_deref(), Some("supersecret"));
        assert_eq!(cfg.endpoint.url, "https://example.com/api/v1/pomodoro");
    }

    #[test]
    fn set_accepts_integer_volume() {
        let mut cfg = Config::default();
        cfg.set("sound.volume", "0").unwrap();
        assert_eq!(cfg.sound.volume, 0.0);
    }

    #[test]
    fn set_clears_optional_value() {
        let mut cfg = Config::default();
        cfg.set("endpoint.user_id", "someone").unwrap();
        assert_eq!(cfg.endpoint.user_id.as_deref(), Some("someone"));
        cfg.set("endpoint.user_id", "").unwrap();
        assert_eq!(cfg.timer_settings().unwrap().user_id, None);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("nope.key", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.auto_repeat", "not_a_bool").is_err());
        assert!(cfg.set("timer.duration_minutes", "soon").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_invalid_values_without_mutating() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.duration_minutes", "45").is_err());
        assert!(cfg.set("sound.volume", "1.5").is_err());
        assert!(cfg.set("endpoint.url", "not a url").is_err());
        assert!(cfg.set("endpoint.url", "ftp://example.com/x").is_err());
        assert!(cfg.set("endpoint.timeout_secs", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn validate_fails_fast() {
        let mut cfg = Config::default();
        cfg.timer.duration_minutes = 24;
        assert!(cfg.validate().is_err());
        assert!(cfg.timer_settings().is_err());

        let mut cfg = Config::default();
        cfg.endpoint.api_key_header = " ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn timer_settings_from_config() {
        let mut cfg = Config::default();
        cfg.timer.duration_minutes = 30;
        cfg.timer.auto_repeat = false;
        cfg.sound.enabled = false;
        cfg.sound.volume = 0.5;
        cfg.endpoint.user_id = Some("u-1".into());

        let settings = cfg.timer_settings().unwrap();
        assert_eq!(settings.length, SessionLength::Thirty);
        assert!(!settings.auto_repeat);
        assert!(!settings.sound_enabled);
        assert_eq!(settings.sound_volume, 0.5);
        assert_eq!(settings.user_id.as_deref(), Some("u-1"));
    }

    #[test]
    fn load_from_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("timer.duration_minutes", "50").unwrap();
        cfg.set("endpoint.api_key", "k").unwrap();
        cfg.sound.directory = Some(dir.path().join("sounds"));
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.sounds_dir().unwrap(), dir.path().join("sounds"));
    }

    #[test]
    fn load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\nduration_minutes = 7\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "this is = = not toml").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
