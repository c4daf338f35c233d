//! Model module - Application state and data types
//!
//! - `types`: tracks, playlists, users and UI enums
//! - `queue`: the playback queue
//! - `playback`: progress timing and the now-playing snapshot
//! - `settings`: UI state persisted between runs
//! - `library`: local document store for the profile and playlists
//! - `content`: main-area views and navigation history
//! - `youtube`: video platform API client
//! - `app_model`: the single application model

mod app_model;
mod content;
mod library;
mod playback;
mod queue;
mod settings;
mod types;
mod youtube;

pub use types::{
    ActiveSection, AuthProvider, BlockingScreen, ChannelDetails, ChannelFeed, LIKED_SONGS_NAME,
    LibraryItem, Page, Playlist, PlaylistItem, PlaylistKind, PlaylistSource, Popup, Subscription,
    Track, UiState, User, watch_url,
};

pub use app_model::{AppModel, PlayerSync};
pub use content::{ContentState, ContentView};
pub use library::Library;
pub use playback::{PlaybackInfo, PlaybackTiming};
pub use queue::{PlaybackQueue, QueueStatus};
pub use settings::{Settings, Theme};
pub use youtube::{YouTubeClient, parse_duration};
