use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub write_timeout_secs: Option<u64>,
    #[serde(default)]
    pub due_soon_threshold_hours: Option<i64>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/taskdeck/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("taskdeck/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("taskdeck\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(content) = std::fs::read_to_string(&config_path) {
                    if let Ok(config) = toml::from_str(&content) {
                        return config;
                    }
                }
            }
        }
        Self::default()
    }

    /// Timeout applied to a single remote write before it is treated as failed.
    pub fn effective_write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs.unwrap_or(10))
    }

    /// Window ahead of now within which a due date counts as "due soon".
    pub fn effective_due_soon_threshold(&self) -> chrono::Duration {
        chrono::Duration::hours(self.due_soon_threshold_hours.unwrap_or(24))
    }
}
