use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::dictionary::DEFAULT_DICTIONARY;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_dictionary")]
    pub dictionary: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_count_timeouts_as_mistakes")]
    pub count_timeouts_as_mistakes: bool,
    #[serde(default = "default_report_size")]
    pub report_size: usize,
    #[serde(default = "default_save_dir")]
    pub save_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_time_limit_secs() -> u32 {
    10
}
fn default_cooldown_ms() -> u64 {
    1500
}
fn default_dictionary() -> String {
    DEFAULT_DICTIONARY.to_string()
}
fn default_theme() -> String {
    "default".to_string()
}
fn default_count_timeouts_as_mistakes() -> bool {
    false
}
fn default_report_size() -> usize {
    5
}
fn default_save_dir() -> String {
    data_dir().join("games").to_string_lossy().to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Per-user data directory for saves and logs.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wordrush")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit_secs(),
            cooldown_ms: default_cooldown_ms(),
            dictionary: default_dictionary(),
            theme: default_theme(),
            count_timeouts_as_mistakes: default_count_timeouts_as_mistakes(),
            report_size: default_report_size(),
            save_dir: default_save_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordrush")
            .join("config.toml")
    }

    /// Clamp numeric settings into playable ranges and fill blank strings.
    pub fn validate(&mut self) {
        self.time_limit_secs = self.time_limit_secs.clamp(1, 120);
        self.cooldown_ms = self.cooldown_ms.min(10_000);
        self.report_size = self.report_size.clamp(1, 20);
        if self.dictionary.trim().is_empty() {
            self.dictionary = default_dictionary();
        }
        if self.save_dir.trim().is_empty() {
            self.save_dir = default_save_dir();
        }
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    pub fn save_path(&self) -> PathBuf {
        PathBuf::from(&self.save_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.time_limit_secs, 10);
        assert_eq!(config.cooldown_ms, 1500);
        assert_eq!(config.dictionary, DEFAULT_DICTIONARY);
        assert!(!config.count_timeouts_as_mistakes);
        assert_eq!(config.report_size, 5);
        assert!(config.save_dir.contains("games"));
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let toml_str = r#"
time_limit_secs = 20
count_timeouts_as_mistakes = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.time_limit_secs, 20);
        assert!(config.count_timeouts_as_mistakes);
        assert_eq!(config.cooldown_ms, 1500);
        assert_eq!(config.theme, "default");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.time_limit_secs, deserialized.time_limit_secs);
        assert_eq!(config.save_dir, deserialized.save_dir);
        assert_eq!(config.dictionary, deserialized.dictionary);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.time_limit_secs = 0;
        config.cooldown_ms = 60_000;
        config.report_size = 500;
        config.dictionary = "  ".to_string();
        config.validate();

        assert_eq!(config.time_limit_secs, 1);
        assert_eq!(config.cooldown_ms, 10_000);
        assert_eq!(config.report_size, 20);
        assert_eq!(config.dictionary, DEFAULT_DICTIONARY);
    }
}
