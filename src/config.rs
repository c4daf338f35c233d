use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_DIR: &str = "synapse";
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// User-editable configuration, stored in `config.toml`.
/// Environment variables override file values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_region")]
    pub region_code: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
    #[serde(default = "default_mpv")]
    pub mpv_path: String,
    #[serde(default = "default_ytdlp")]
    pub ytdlp_path: String,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_region() -> String {
    "US".to_string()
}

fn default_max_results() -> u32 {
    20
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_mpv() -> String {
    "mpv".to_string()
}

fn default_ytdlp() -> String {
    "yt-dlp".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region_code: default_region(),
            max_results: default_max_results(),
            api_base_url: default_api_base(),
            mpv_path: default_mpv(),
            ytdlp_path: default_ytdlp(),
            download_dir: None,
            data_dir: None,
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Persisted UI state lives next to the config
    pub fn state_path() -> PathBuf {
        Self::config_dir().join("state.toml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }

    pub fn library_path(&self) -> PathBuf {
        self.data_dir().join("library.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            dirs::audio_dir()
                .or_else(|| dirs::home_dir().map(|h| h.join("Music")))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Synapse")
        })
    }

    /// Load `config.toml` and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// A missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("SYNAPSE_API_KEY").or_else(|| var("YT_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(region) = var("SYNAPSE_REGION") {
            self.region_code = region;
        }
        if let Some(mpv) = var("SYNAPSE_MPV") {
            self.mpv_path = mpv;
        }
        if let Some(dir) = var("SYNAPSE_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Everything that prevents the app from working, for the startup
    /// diagnostic screen
    pub fn problems(&self) -> Vec<ConfigError> {
        let mut problems = Vec::new();
        if self.api_key().is_none() {
            problems.push(ConfigError::MissingApiKey {
                path: Self::config_path(),
            });
        }
        let region = self.region_code.trim();
        if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
            problems.push(ConfigError::InvalidRegion(self.region_code.clone()));
        }
        problems
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("synapse-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/synapse/config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.region_code, "US");
        assert_eq!(config.max_results, 20);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = temp_file("partial", "api_key = \"k\"\nregion_code = \"DE\"\n");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_key(), Some("k"));
        assert_eq!(config.region_code, "DE");
        assert_eq!(config.mpv_path, "mpv");
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let path = temp_file("bad", "api_key = [");
        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn env_overrides_file() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("YT_API_KEY", "from-env"), ("SYNAPSE_REGION", "GB")]);
        let mut config = AppConfig {
            api_key: Some("from-file".to_string()),
            ..AppConfig::default()
        };
        config.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_key(), Some("from-env"));
        assert_eq!(config.region_code, "GB");
    }

    #[test]
    fn blank_api_key_is_a_problem() {
        let config = AppConfig {
            api_key: Some("   ".to_string()),
            ..AppConfig::default()
        };
        let problems = config.problems();
        assert_eq!(problems.len(), 1);
        assert!(matches!(problems[0], ConfigError::MissingApiKey { .. }));
    }

    #[test]
    fn bad_region_is_a_problem() {
        let config = AppConfig {
            api_key: Some("k".to_string()),
            region_code: "USA".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.problems()[0], ConfigError::InvalidRegion(_)));
    }

    #[test]
    fn generated_config_parses_back() {
        let config = AppConfig::default();
        let parsed: AppConfig = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }
}
