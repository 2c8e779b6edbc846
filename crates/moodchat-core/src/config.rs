use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::turn::Timing;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/chat";
pub const ENDPOINT_ENV: &str = "MOODCHAT_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    /// Pause between the outgoing bubble and the loading bubble
    pub loading_delay_ms: u64,
    /// Time between revealed words
    pub reveal_tick_ms: u64,
    pub suggestions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            loading_delay_ms: 400,
            reveal_tick_ms: 50,
            suggestions: vec![
                "I had a rough day at work today".to_string(),
                "Tell me something that will cheer me up".to_string(),
                "I'm nervous about an exam tomorrow".to_string(),
                "Help me plan a relaxing weekend".to_string(),
            ],
        }
    }

    /// Load from the default location, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path)?;
            serde_json::from_str(&config_content)
                .map_err(|e| anyhow!("Invalid config file {:?}: {}", path, e))?
        } else {
            Self::new()
        };

        // Environment takes precedence over the file
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint;
            }
        }

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            loading_delay: Duration::from_millis(self.loading_delay_ms),
            reveal_tick: Duration::from_millis(self.reveal_tick_ms),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("moodchat").join("config.json"))
    }

    pub fn get_data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(data_dir.join("moodchat"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Tests that touch the process environment take this first
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.loading_delay_ms, 400);
        assert_eq!(config.reveal_tick_ms, 50);
        assert_eq!(config.suggestions.len(), 4);
        assert_eq!(config.timing().reveal_tick, Duration::from_millis(50));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"reveal_tick_ms": 10}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.reveal_tick_ms, 10);
        assert_eq!(config.loading_delay_ms, 400);
        assert!(!config.suggestions.is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.loading_delay_ms = 0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.loading_delay_ms, 0);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_endpoint_env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint": "http://file.example/chat"}"#).unwrap();

        std::env::set_var(ENDPOINT_ENV, "http://env.example/chat");
        let from_env = Config::load_from(&path).unwrap();

        std::env::set_var(ENDPOINT_ENV, "   ");
        let blank_env = Config::load_from(&path).unwrap();

        std::env::remove_var(ENDPOINT_ENV);
        let no_env = Config::load_from(&path).unwrap();

        assert_eq!(from_env.endpoint, "http://env.example/chat");
        assert_eq!(blank_env.endpoint, "http://file.example/chat");
        assert_eq!(no_env.endpoint, "http://file.example/chat");
    }
}
