use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const APP_DIR: &str = "character_stats";
const CONFIG_FILE: &str = "config.json";

/// Application settings that are not user stat preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chat-completion endpoint used for generation
    pub endpoint: String,
    pub models_endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// How often the active character is re-checked
    pub poll_interval_ms: u64,
    pub ui_scale: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".into(),
            models_endpoint: "http://localhost:1234/v1/models".into(),
            model: "local-model".into(),
            temperature: 0.7,
            poll_interval_ms: 1000,
            ui_scale: 1.0,
        }
    }
}

impl AppConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }

    /// Missing or malformed files yield the defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::error!("Failed to save config to {}: {}", path.display(), e);
                }
            }
            Err(e) => log::error!("Failed to serialize config: {}", e),
        }
    }

    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn save(&self) {
        self.save_to(&config_path());
    }
}

/// Directory holding the config file and the stat storage partitions.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    fs::create_dir_all(&path).ok();
    path
}

fn config_path() -> PathBuf {
    data_dir().join(CONFIG_FILE)
}
