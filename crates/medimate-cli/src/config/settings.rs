//! CLI configuration file support
//!
//! Loads configuration from ~/.config/medimate/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use medimate_ai::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use medimate_core::PatientProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for status and export requests. Chat streams are unbounded.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub patient_profile: PatientProfile,
    /// Seed the assistant greeting in interactive sessions
    #[serde(default = "default_true")]
    pub greeting: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            patient_profile: PatientProfile::default(),
            greeting: default_true(),
        }
    }
}

impl CliConfig {
    pub fn load() -> Self {
        Self::load_from_path(&Self::config_path())
    }

    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("Warning: Failed to parse config: {err}");
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!("Warning: Failed to read config: {err}");
                Self::default()
            }
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medimate")
            .join("config.toml")
    }

    /// Base URL after applying the command-line / environment override.
    pub fn base_url<'a>(&'a self, override_url: Option<&'a str>) -> &'a str {
        override_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.server.base_url)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_missing() {
        let temp = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from_path(&temp.path().join("config.toml"));
        assert_eq!(config.server.base_url, "http://localhost:7861");
        assert_eq!(config.server.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.chat.patient_profile, PatientProfile::Auto);
        assert!(config.chat.greeting);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nbase_url = \"http://10.0.0.5:7861\"\n\n[chat]\npatient_profile = \"pediatric\"\n",
        )
        .unwrap();

        let config = CliConfig::load_from_path(&path);
        assert_eq!(config.server.base_url, "http://10.0.0.5:7861");
        assert_eq!(config.server.request_timeout_secs, 60);
        assert_eq!(config.chat.patient_profile, PatientProfile::Pediatric);
        assert!(config.chat.greeting);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[server\nbase_url = ").unwrap();

        let config = CliConfig::load_from_path(&path);
        assert_eq!(config.server.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_override_wins_unless_blank() {
        let config = CliConfig::default();
        assert_eq!(config.base_url(Some("http://remote:9000")), "http://remote:9000");
        assert_eq!(config.base_url(Some("  ")), DEFAULT_BASE_URL);
        assert_eq!(config.base_url(None), DEFAULT_BASE_URL);
    }
}
