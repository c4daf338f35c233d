//! Core type definitions for the application

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::auth::LinkedToken;

/// A playable video, as returned by the platform API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub video_id: String,
    pub title: String,
    /// Channel name
    pub artist: String,
    pub channel_id: String,
    pub thumbnail: String,
    pub duration_secs: u32,
}

impl Track {
    pub fn watch_url(&self) -> String {
        watch_url(&self.video_id)
    }

    pub fn same_video(&self, other: &Track) -> bool {
        self.video_id == other.video_id
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Where a playlist lives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistSource {
    #[default]
    Local,
    YouTube,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistKind {
    #[default]
    Regular,
    LikedSongs,
}

pub const LIKED_SONGS_NAME: &str = "Liked Songs";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub owner_name: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub track_count: u32,
    #[serde(default)]
    pub source: PlaylistSource,
    #[serde(default)]
    pub kind: PlaylistKind,
}

impl Playlist {
    pub fn is_liked_songs(&self) -> bool {
        self.kind == PlaylistKind::LikedSongs
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.tracks.iter().any(|t| t.video_id == video_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    #[default]
    Local,
    Google,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub provider: AuthProvider,
    #[serde(default)]
    pub linked_token: Option<LinkedToken>,
}

/// A channel the linked account is subscribed to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub channel_id: String,
    pub title: String,
    pub thumbnail: String,
}

/// Latest uploads of one subscribed channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelFeed {
    pub channel: Subscription,
    pub tracks: Vec<Track>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
    pub uploads_playlist_id: Option<String>,
}

/// One page of a paginated listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_page_token: None,
        }
    }
}

/// Which section of the UI is currently active/focused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    Library,
    Playlists,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Library,
            ActiveSection::Library => ActiveSection::Playlists,
            ActiveSection::Playlists => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::Library => ActiveSection::Search,
            ActiveSection::Playlists => ActiveSection::Library,
            ActiveSection::MainContent => ActiveSection::Playlists,
        }
    }
}

/// Fixed entries of the Library sidebar section
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibraryItem {
    Home,
    Subscriptions,
    Queue,
    SearchHistory,
}

impl LibraryItem {
    pub const ALL: [LibraryItem; 4] = [
        LibraryItem::Home,
        LibraryItem::Subscriptions,
        LibraryItem::Queue,
        LibraryItem::SearchHistory,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LibraryItem::Home => "Home",
            LibraryItem::Subscriptions => "Subscriptions",
            LibraryItem::Queue => "Queue",
            LibraryItem::SearchHistory => "Search history",
        }
    }
}

/// Sidebar entry for a playlist (local or linked account)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistItem {
    pub id: String,
    pub name: String,
    pub source: PlaylistSource,
    pub track_count: u32,
}

impl From<&Playlist> for PlaylistItem {
    fn from(p: &Playlist) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            source: p.source,
            track_count: p.track_count,
        }
    }
}

/// Modal popups that capture input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Popup {
    Help,
    /// Pick a local playlist to add `track` to
    PlaylistPicker { track: Box<Track>, selected: usize },
    /// Name entry for a new playlist
    CreatePlaylist { name: String },
}

/// Screens that replace the whole UI until dismissed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockingScreen {
    /// Configuration is unusable (e.g. no API key)
    Diagnostic { problems: Vec<String> },
    /// The document store rejected a write because of permissions
    PermissionGuidance { path: String },
}

/// UI state for the application
#[derive(Clone, Debug)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub library_selected: usize,
    pub playlists: Vec<PlaylistItem>,
    pub playlist_selected: usize,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub status_message: Option<String>,
    pub popup: Option<Popup>,
    pub blocking: Option<BlockingScreen>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::Search,
            search_query: String::new(),
            library_selected: 0,
            playlists: vec![],
            playlist_selected: 0,
            error_message: None,
            error_timestamp: None,
            status_message: None,
            popup: None,
            blocking: None,
        }
    }
}
