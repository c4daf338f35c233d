//! UI state that survives restarts, stored as `state.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const SEARCH_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_VOLUME: u8 = 75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    /// Start the player without a video output
    pub audio_only: bool,
    /// List the linked account's playlists next to local ones
    pub show_external_playlists: bool,
    pub volume: u8,
    /// Most recent first
    pub search_history: Vec<String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            audio_only: true,
            show_external_playlists: false,
            volume: DEFAULT_VOLUME,
            search_history: Vec::new(),
            path: None,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing or unreadable file yields
    /// defaults, so a broken state file never blocks startup.
    pub fn load(path: &Path) -> Self {
        let mut settings = match fs::read_to_string(path) {
            Ok(content) => toml::from_str::<Settings>(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed state file");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        };
        settings.volume = settings.volume.min(100);
        settings.search_history.truncate(SEARCH_HISTORY_LIMIT);
        settings.path = Some(path.to_path_buf());
        settings
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::trace!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Record a submitted query. Blank queries are ignored; a repeated
    /// query moves to the front.
    pub fn push_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.search_history.retain(|q| q != query);
        self.search_history.insert(0, query.to_string());
        self.search_history.truncate(SEARCH_HISTORY_LIMIT);
    }

    pub fn clear_search_history(&mut self) {
        self.search_history.clear();
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("synapse-settings-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("state.toml")
    }

    #[test]
    fn defaults_are_dark_and_audio_only() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.audio_only);
        assert!(!settings.show_external_playlists);
        assert_eq!(settings.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let settings = Settings::load(&temp_path("missing"));
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.search_history.is_empty());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let path = temp_path("save");
        let mut settings = Settings::load(&path);
        settings.theme = Theme::Light;
        settings.audio_only = false;
        settings.push_search("lofi");
        settings.save().unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.theme, Theme::Light);
        assert!(!loaded.audio_only);
        assert_eq!(loaded.search_history, vec!["lofi".to_string()]);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = temp_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "theme = 42").unwrap();
        assert_eq!(Settings::load(&path).theme, Theme::Dark);
    }

    #[test]
    fn search_history_is_capped_and_recent_first() {
        let mut settings = Settings::default();
        for i in 0..25 {
            settings.push_search(&format!("query {}", i));
        }
        assert_eq!(settings.search_history.len(), SEARCH_HISTORY_LIMIT);
        assert_eq!(settings.search_history[0], "query 24");
        assert_eq!(settings.search_history[19], "query 5");
    }

    #[test]
    fn repeated_search_moves_to_front() {
        let mut settings = Settings::default();
        settings.push_search("a");
        settings.push_search("b");
        settings.push_search(" a ");
        assert_eq!(settings.search_history, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn blank_search_is_ignored() {
        let mut settings = Settings::default();
        settings.push_search("   ");
        assert!(settings.search_history.is_empty());
    }

    #[test]
    fn volume_is_clamped() {
        let mut settings = Settings::default();
        settings.set_volume(150);
        assert_eq!(settings.volume, 100);
    }
}
