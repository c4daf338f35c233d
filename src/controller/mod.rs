//! Controller module - Application logic and event handling
//!
//! - `input`: key event handling
//! - `playback`: queue operations and keeping the player widget in step
//! - `navigation`: search, home, channels, playlists, subscriptions
//! - `library`: likes, local playlists and downloads
//! - `player_events`: widget event listener and progress poll

mod input;
mod library;
mod navigation;
mod playback;
mod player_events;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::error::{ApiError, DownloadError, LibraryError, PlayerError};
use crate::model::{AppModel, YouTubeClient};
use crate::player::PlayerWidget;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) youtube: YouTubeClient,
    widget: Arc<RwLock<Option<Arc<dyn PlayerWidget>>>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, youtube: YouTubeClient) -> Self {
        Self {
            model,
            youtube,
            widget: Arc::new(RwLock::new(None)),
        }
    }

    /// Install the player and start listening to it
    pub async fn attach_widget(&self, widget: Arc<dyn PlayerWidget>) {
        let events = widget.subscribe();
        self.set_widget(widget).await;
        match events {
            Some(events) => self.start_player_event_listener(events),
            None => tracing::warn!("Player event stream already taken"),
        }
        self.start_progress_poll();
    }

    pub(crate) async fn set_widget(&self, widget: Arc<dyn PlayerWidget>) {
        *self.widget.write().await = Some(widget);
    }

    pub(crate) async fn widget(&self) -> Option<Arc<dyn PlayerWidget>> {
        self.widget.read().await.clone()
    }

    pub(crate) async fn show_error(&self, error: impl Into<anyhow::Error>) {
        let message = Self::format_error(&error.into());
        self.model.lock().await.set_error(message);
    }

    pub(crate) fn format_error(error: &anyhow::Error) -> String {
        if let Some(api) = error.downcast_ref::<ApiError>() {
            return match api.status() {
                Some(401) => "Linked account rejected the token. Link it again.".to_string(),
                Some(403) => {
                    "Request forbidden. The API key may be invalid or out of quota.".to_string()
                }
                Some(404) => "Not found on the video platform.".to_string(),
                Some(429) => "Rate limited. Please wait a moment.".to_string(),
                _ => api.to_string(),
            };
        }
        if let Some(player) = error.downcast_ref::<PlayerError>() {
            return match player {
                PlayerError::Spawn { program, .. } => {
                    format!("Could not start '{}'. Is mpv installed?", program)
                }
                PlayerError::Disconnected | PlayerError::ConnectTimeout => {
                    "Player is not running. Restart Synapse.".to_string()
                }
                other => other.to_string(),
            };
        }
        if let Some(download) = error.downcast_ref::<DownloadError>() {
            return match download {
                DownloadError::Spawn { program, .. } => {
                    format!("Could not run '{}'. Is yt-dlp installed?", program)
                }
                other => other.to_string(),
            };
        }
        if let Some(library) = error.downcast_ref::<LibraryError>() {
            return library.to_string();
        }
        format!("Error: {}", error)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::model::{Library, Settings, Track};
    use crate::player::fake::FakeWidget;

    pub(crate) fn track(id: &str) -> Track {
        Track {
            video_id: id.to_string(),
            title: format!("Song {}", id),
            artist: "Artist".to_string(),
            channel_id: "UC1".to_string(),
            thumbnail: String::new(),
            duration_secs: 200,
        }
    }

    /// Controller over a fresh temp library with a fake widget installed
    pub(crate) async fn controller(name: &str) -> (AppController, Arc<FakeWidget>) {
        let dir = std::env::temp_dir().join(format!("synapse-ctl-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut library = Library::open(dir.join("library.json")).unwrap();
        library.ensure_profile("tester").unwrap();

        let config = AppConfig::default();
        let youtube = YouTubeClient::new(&config, None);
        let model = AppModel::new(config, Settings::default(), library);
        let controller = AppController::new(Arc::new(Mutex::new(model)), youtube);

        let fake = Arc::new(FakeWidget::new());
        controller.set_widget(fake.clone()).await;
        (controller, fake)
    }

    #[test]
    fn api_errors_get_friendly_messages() {
        let quota = anyhow::Error::new(ApiError::Api {
            status: 403,
            message: "quotaExceeded".to_string(),
        });
        assert!(AppController::format_error(&quota).contains("quota"));

        let rate = anyhow::Error::new(ApiError::Api {
            status: 429,
            message: String::new(),
        });
        assert_eq!(AppController::format_error(&rate), "Rate limited. Please wait a moment.");

        let unlinked = anyhow::Error::new(ApiError::NotLinked);
        assert!(AppController::format_error(&unlinked).contains("synapse link"));
    }

    #[test]
    fn missing_player_is_explained() {
        let err = anyhow::Error::new(PlayerError::Spawn {
            program: "mpv".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(
            AppController::format_error(&err),
            "Could not start 'mpv'. Is mpv installed?"
        );
        assert_eq!(
            AppController::format_error(&anyhow::anyhow!("boom")),
            "Error: boom"
        );
    }
}
