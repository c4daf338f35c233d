//! Content view state: what the main area shows and how to get back

use super::types::{ChannelDetails, ChannelFeed, Playlist, Track};

/// Represents the current view in the main content area
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ContentView {
    #[default]
    Empty,
    /// Trending music
    Home { tracks: Vec<Track> },
    SearchResults { query: String, tracks: Vec<Track> },
    Channel {
        details: ChannelDetails,
        tracks: Vec<Track>,
        next_page_token: Option<String>,
    },
    Playlist {
        playlist: Playlist,
        tracks: Vec<Track>,
        next_page_token: Option<String>,
    },
    Subscriptions { feeds: Vec<ChannelFeed> },
    /// Rendered from the live playback queue
    Queue,
    SearchHistory { entries: Vec<String> },
}

impl ContentView {
    pub fn title(&self) -> String {
        match self {
            ContentView::Empty => String::new(),
            ContentView::Home { .. } => "Trending".to_string(),
            ContentView::SearchResults { query, .. } => format!("Results for \"{}\"", query),
            ContentView::Channel { details, .. } => details.title.clone(),
            ContentView::Playlist { playlist, .. } => playlist.name.clone(),
            ContentView::Subscriptions { .. } => "Subscriptions".to_string(),
            ContentView::Queue => "Queue".to_string(),
            ContentView::SearchHistory { .. } => "Search history".to_string(),
        }
    }

    /// Tracks shown as a flat, selectable list
    pub fn tracks(&self) -> Option<&[Track]> {
        match self {
            ContentView::Home { tracks }
            | ContentView::SearchResults { tracks, .. }
            | ContentView::Channel { tracks, .. }
            | ContentView::Playlist { tracks, .. } => Some(tracks),
            _ => None,
        }
    }

    /// Number of selectable rows. The queue view is sized by the caller.
    pub fn len(&self) -> usize {
        match self {
            ContentView::Subscriptions { feeds } => feeds.iter().map(|f| f.tracks.len()).sum(),
            ContentView::SearchHistory { entries } => entries.len(),
            view => view.tracks().map_or(0, <[Track]>::len),
        }
    }

    /// The track at `index` and the list it should be played in
    pub fn track_at(&self, index: usize) -> Option<(Track, Vec<Track>)> {
        if let ContentView::Subscriptions { feeds } = self {
            let mut offset = index;
            for feed in feeds {
                if offset < feed.tracks.len() {
                    return Some((feed.tracks[offset].clone(), feed.tracks.clone()));
                }
                offset -= feed.tracks.len();
            }
            return None;
        }
        let tracks = self.tracks()?;
        tracks.get(index).map(|t| (t.clone(), tracks.to_vec()))
    }

    pub fn next_page_token(&self) -> Option<&str> {
        match self {
            ContentView::Channel { next_page_token, .. }
            | ContentView::Playlist { next_page_token, .. } => next_page_token.as_deref(),
            _ => None,
        }
    }
}

/// State for the main content area
#[derive(Clone, Debug, Default)]
pub struct ContentState {
    pub view: ContentView,
    pub selected_index: usize,
    pub navigation_stack: Vec<(ContentView, usize)>,
    pub is_loading: bool,
}

impl ContentState {
    /// Open `view`, remembering the current one for `back`
    pub fn show(&mut self, view: ContentView) {
        let previous = std::mem::replace(&mut self.view, view);
        if previous != ContentView::Empty && previous != self.view {
            self.navigation_stack.push((previous, self.selected_index));
        }
        self.selected_index = 0;
        self.is_loading = false;
    }

    /// Swap the data of the current view without touching history
    pub fn replace(&mut self, view: ContentView) {
        self.view = view;
        self.is_loading = false;
    }

    /// Return to the previous view. False when there is none.
    pub fn back(&mut self) -> bool {
        match self.navigation_stack.pop() {
            Some((view, selected)) => {
                self.view = view;
                self.selected_index = selected;
                self.is_loading = false;
                true
            }
            None => false,
        }
    }

    pub fn move_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn move_down(&mut self, len: usize) {
        if self.selected_index + 1 < len {
            self.selected_index += 1;
        }
    }

    pub fn clamp_selection(&mut self, len: usize) {
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    /// Add the next page of a paginated view
    pub fn append_page(&mut self, mut more: Vec<Track>, next: Option<String>) {
        match &mut self.view {
            ContentView::Channel { tracks, next_page_token, .. }
            | ContentView::Playlist { tracks, next_page_token, .. } => {
                more.retain(|t| !tracks.iter().any(|existing| existing.same_video(t)));
                tracks.extend(more);
                *next_page_token = next;
            }
            _ => {}
        }
        self.is_loading = false;
    }
}
