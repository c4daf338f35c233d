//! Main application model with state management.
//!
//! The controller keeps this behind one `Arc<Mutex<_>>`, so every method
//! here runs as a single atomic transition.

use std::time::Instant;

use super::content::{ContentState, ContentView};
use super::library::Library;
use super::playback::{PlaybackInfo, PlaybackTiming};
use super::queue::PlaybackQueue;
use super::settings::{Settings, Theme};
use super::types::{
    ActiveSection, BlockingScreen, LibraryItem, Playlist, PlaylistItem, PlaylistSource, Popup,
    Track, UiState,
};
use crate::config::AppConfig;
use crate::error::LibraryError;
use crate::player::{Lifecycle, LifecycleAction, PlaybackState, WidgetEvent};

const ERROR_DISPLAY_SECS: u64 = 5;
const VOLUME_STEP: u8 = 5;

/// What the player widget must do to match the queue after a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerSync {
    Nothing,
    Load(String),
    Play,
    Pause,
    Stop,
}

/// Main application model containing all state
pub struct AppModel {
    pub queue: PlaybackQueue,
    pub lifecycle: Lifecycle,
    timing: PlaybackTiming,
    pub ui: UiState,
    pub content: ContentState,
    pub library: Library,
    pub settings: Settings,
    pub config: AppConfig,
    external_playlists: Vec<Playlist>,
    should_quit: bool,
}

impl AppModel {
    pub fn new(config: AppConfig, settings: Settings, library: Library) -> Self {
        let mut model = Self {
            queue: PlaybackQueue::new(),
            lifecycle: Lifecycle::new(),
            timing: PlaybackTiming::default(),
            ui: UiState::default(),
            content: ContentState::default(),
            library,
            settings,
            config,
            external_playlists: Vec::new(),
            should_quit: false,
        };
        model.refresh_playlists();
        model
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.should_quit = quit;
    }

    // ========================================================================
    // Queue & Playback
    // ========================================================================

    fn position(&self) -> Option<(usize, String)> {
        self.queue
            .index()
            .zip(self.queue.current().map(|t| t.video_id.clone()))
    }

    /// Work out the widget command after a queue transition
    fn sync_after(&mut self, before: Option<(usize, String)>, was_playing: bool) -> PlayerSync {
        let after = self.position();
        if after != before {
            return match (after, self.queue.current()) {
                (Some((_, video_id)), Some(track)) => {
                    self.timing.reset(track.duration_secs);
                    tracing::info!(video_id = %video_id, title = %track.title, "Now playing");
                    PlayerSync::Load(video_id)
                }
                _ => {
                    self.timing = PlaybackTiming::default();
                    tracing::info!("Queue finished");
                    PlayerSync::Stop
                }
            };
        }
        match (was_playing, self.queue.is_playing()) {
            (false, true) => PlayerSync::Play,
            (true, false) => PlayerSync::Pause,
            _ => PlayerSync::Nothing,
        }
    }

    fn transition(&mut self, op: impl FnOnce(&mut PlaybackQueue)) -> PlayerSync {
        let before = self.position();
        let was_playing = self.queue.is_playing();
        op(&mut self.queue);
        self.sync_after(before, was_playing)
    }

    pub fn play(&mut self, track: Track, context: Vec<Track>) -> PlayerSync {
        self.transition(|q| q.play(track, context))
    }

    pub fn toggle_play(&mut self) -> PlayerSync {
        self.transition(PlaybackQueue::toggle_play)
    }

    pub fn next(&mut self) -> PlayerSync {
        self.transition(PlaybackQueue::next)
    }

    pub fn previous(&mut self) -> PlayerSync {
        self.transition(PlaybackQueue::previous)
    }

    pub fn add_to_queue(&mut self, track: Track) -> PlayerSync {
        self.transition(|q| q.add_to_queue(track))
    }

    /// Feed a widget event through the lifecycle and mirror play/pause
    pub fn apply_widget_event(&mut self, event: &WidgetEvent) -> LifecycleAction {
        let action = self.lifecycle.apply(event);
        if let WidgetEvent::StateChanged(state) = event {
            let playing = match state {
                PlaybackState::Playing => Some(true),
                PlaybackState::Paused => Some(false),
                PlaybackState::Buffering => None,
            };
            if let Some(playing) = playing {
                self.queue.set_playing(playing);
                self.timing.set_playing(playing && self.queue.current().is_some());
            }
        }
        action
    }

    /// Apply a widget event and the queue transition it calls for in one
    /// step, so no other transition can slip in between.
    ///
    /// A failure skips the track whenever the queue has one loaded,
    /// including one that never got past buffering.
    pub fn widget_event(&mut self, event: &WidgetEvent) -> PlayerSync {
        match self.apply_widget_event(event) {
            LifecycleAction::None => PlayerSync::Nothing,
            LifecycleAction::AdvanceQueue => {
                tracing::info!("Track ended, advancing queue");
                self.next()
            }
            LifecycleAction::Failed(message) => {
                let loaded = self.queue.current().map(|t| t.video_id.clone());
                self.set_error(message);
                match loaded {
                    Some(video_id) => {
                        tracing::warn!(video_id = %video_id, "Playback failed, skipping track");
                        self.next()
                    }
                    None => PlayerSync::Nothing,
                }
            }
        }
    }

    pub fn widget_stopped(&mut self) {
        self.lifecycle.stopped();
    }

    pub fn update_position(&mut self, position_secs: f64) {
        let playing = self.queue.is_playing();
        self.timing.update_position(position_secs, playing);
    }

    pub fn seek_target(&self, delta_secs: f64) -> Option<f64> {
        self.queue.current()?;
        let target = self.timing.current_position_secs() + delta_secs;
        Some(target.clamp(0.0, self.timing.duration_secs.max(0.0)))
    }

    pub fn change_volume(&mut self, up: bool) -> u8 {
        let volume = if up {
            self.settings.volume.saturating_add(VOLUME_STEP)
        } else {
            self.settings.volume.saturating_sub(VOLUME_STEP)
        };
        self.settings.set_volume(volume);
        self.save_settings();
        self.settings.volume
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        let track = self.queue.current().cloned();
        let liked = track
            .as_ref()
            .is_some_and(|t| self.library.is_liked(&t.video_id));
        PlaybackInfo {
            progress_secs: self.timing.current_position_secs(),
            duration_secs: self.timing.duration_secs,
            status: self.queue.status(),
            widget_state: self.lifecycle.state(),
            volume: self.settings.volume,
            audio_only: self.settings.audio_only,
            liked,
            queue_position: self.queue.index().map(|i| (i + 1, self.queue.tracks().len())),
            track,
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    fn save_settings(&self) {
        if let Err(e) = self.settings.save() {
            tracing::warn!(error = %e, "Could not save settings");
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.settings.theme = self.settings.theme.toggled();
        self.save_settings();
        self.settings.theme
    }

    /// Takes effect the next time the player starts
    pub fn toggle_audio_only(&mut self) -> bool {
        self.settings.audio_only = !self.settings.audio_only;
        self.save_settings();
        self.settings.audio_only
    }

    pub fn toggle_external_playlists(&mut self) -> bool {
        self.settings.show_external_playlists = !self.settings.show_external_playlists;
        self.save_settings();
        self.refresh_playlists();
        self.settings.show_external_playlists
    }

    pub fn record_search(&mut self, query: &str) {
        self.settings.push_search(query);
        self.save_settings();
    }

    pub fn clear_search_history(&mut self) {
        self.settings.clear_search_history();
        self.save_settings();
        if matches!(self.content.view, ContentView::SearchHistory { .. }) {
            self.content.replace(ContentView::SearchHistory { entries: Vec::new() });
            self.content.selected_index = 0;
        }
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub fn cycle_section_forward(&mut self) {
        self.ui.active_section = self.ui.active_section.next();
    }

    pub fn cycle_section_backward(&mut self) {
        self.ui.active_section = self.ui.active_section.prev();
    }

    pub fn set_active_section(&mut self, section: ActiveSection) {
        self.ui.active_section = section;
    }

    pub fn move_selection_up(&mut self) {
        match self.ui.active_section {
            ActiveSection::Library => {
                self.ui.library_selected = self.ui.library_selected.saturating_sub(1);
            }
            ActiveSection::Playlists => {
                self.ui.playlist_selected = self.ui.playlist_selected.saturating_sub(1);
            }
            ActiveSection::MainContent => self.content.move_up(),
            ActiveSection::Search => {}
        }
    }

    pub fn move_selection_down(&mut self) {
        match self.ui.active_section {
            ActiveSection::Library => {
                if self.ui.library_selected + 1 < LibraryItem::ALL.len() {
                    self.ui.library_selected += 1;
                }
            }
            ActiveSection::Playlists => {
                if self.ui.playlist_selected + 1 < self.ui.playlists.len() {
                    self.ui.playlist_selected += 1;
                }
            }
            ActiveSection::MainContent => {
                let len = self.content_len();
                self.content.move_down(len);
            }
            ActiveSection::Search => {}
        }
    }

    pub fn selected_library_item(&self) -> LibraryItem {
        LibraryItem::ALL[self.ui.library_selected.min(LibraryItem::ALL.len() - 1)]
    }

    pub fn selected_playlist(&self) -> Option<PlaylistItem> {
        self.ui.playlists.get(self.ui.playlist_selected).cloned()
    }

    pub fn append_to_search(&mut self, c: char) {
        self.ui.search_query.push(c);
    }

    pub fn backspace_search(&mut self) {
        self.ui.search_query.pop();
    }

    pub fn clear_search(&mut self) {
        self.ui.search_query.clear();
    }

    pub fn set_error(&mut self, message: String) {
        tracing::warn!(message = %message, "Showing error");
        self.ui.error_message = Some(message);
        self.ui.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.ui.error_message = None;
        self.ui.error_timestamp = None;
    }

    pub fn has_error(&self) -> bool {
        self.ui.error_message.is_some()
    }

    pub fn auto_clear_old_errors(&mut self) {
        if let Some(timestamp) = self.ui.error_timestamp {
            if timestamp.elapsed().as_secs() >= ERROR_DISPLAY_SECS {
                self.clear_error();
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.ui.status_message = Some(message.into());
    }

    pub fn show_popup(&mut self, popup: Popup) {
        self.ui.popup = Some(popup);
    }

    pub fn close_popup(&mut self) {
        self.ui.popup = None;
    }

    pub fn show_blocking(&mut self, screen: BlockingScreen) {
        self.ui.blocking = Some(screen);
    }

    pub fn dismiss_blocking(&mut self) {
        self.ui.blocking = None;
    }

    /// Route a store failure: permission problems get the guidance screen
    pub fn report_library_error(&mut self, error: &LibraryError) {
        if error.is_permission_denied() {
            let path = error
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| self.library.path().display().to_string());
            tracing::error!(path = %path, "Library store is not writable");
            self.show_blocking(BlockingScreen::PermissionGuidance { path });
        } else {
            self.set_error(error.to_string());
        }
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub fn set_content_loading(&mut self, loading: bool) {
        self.content.is_loading = loading;
    }

    pub fn show_content(&mut self, view: ContentView) {
        self.content.show(view);
        self.ui.active_section = ActiveSection::MainContent;
    }

    pub fn navigate_back(&mut self) -> bool {
        self.content.back()
    }

    pub fn content_len(&self) -> usize {
        match self.content.view {
            ContentView::Queue => self.queue.tracks().len(),
            ref view => view.len(),
        }
    }

    /// Selected track plus the list it should be played in
    pub fn selected_track(&self) -> Option<(Track, Vec<Track>)> {
        let index = self.content.selected_index;
        match &self.content.view {
            ContentView::Queue => {
                let tracks = self.queue.tracks();
                tracks.get(index).map(|t| (t.clone(), tracks.to_vec()))
            }
            view => view.track_at(index),
        }
    }

    pub fn selected_history_entry(&self) -> Option<String> {
        match &self.content.view {
            ContentView::SearchHistory { entries } => entries.get(self.content.selected_index).cloned(),
            _ => None,
        }
    }

    /// Channel of the selected track, for "go to channel"
    pub fn selected_channel_id(&self) -> Option<String> {
        self.selected_track()
            .map(|(t, _)| t.channel_id)
            .filter(|id| !id.is_empty())
    }

    /// Next page to fetch when the selection reaches the end of a paged view
    pub fn pending_page(&self) -> Option<(ContentView, String)> {
        if self.content.is_loading {
            return None;
        }
        let len = self.content.view.len();
        if len == 0 || self.content.selected_index + 1 < len {
            return None;
        }
        let token = self.content.view.next_page_token()?.to_string();
        Some((self.content.view.clone(), token))
    }

    // ========================================================================
    // Library
    // ========================================================================

    /// Rebuild the sidebar list from local and (optionally) linked playlists
    pub fn refresh_playlists(&mut self) {
        let mut items: Vec<PlaylistItem> =
            self.library.playlists().iter().map(PlaylistItem::from).collect();
        if self.settings.show_external_playlists {
            items.extend(self.external_playlists.iter().map(PlaylistItem::from));
        }
        self.ui.playlists = items;
        if self.ui.playlist_selected >= self.ui.playlists.len() {
            self.ui.playlist_selected = self.ui.playlists.len().saturating_sub(1);
        }
    }

    pub fn set_external_playlists(&mut self, playlists: Vec<Playlist>) {
        self.external_playlists = playlists;
        self.refresh_playlists();
    }

    pub fn external_playlist(&self, id: &str) -> Option<&Playlist> {
        self.external_playlists.iter().find(|p| p.id == id)
    }

    pub fn local_playlists(&self) -> Vec<PlaylistItem> {
        self.library
            .playlists()
            .iter()
            .filter(|p| p.source == PlaylistSource::Local)
            .map(PlaylistItem::from)
            .collect()
    }

    /// Mirror a local playlist change into an open playlist view
    fn refresh_open_playlist(&mut self, id: &str) {
        let Some(updated) = self.library.playlist(id).cloned() else {
            return;
        };
        if let ContentView::Playlist { playlist, tracks, .. } = &mut self.content.view {
            if playlist.id == id {
                *tracks = updated.tracks.clone();
                *playlist = updated;
            }
        }
        let len = self.content_len();
        self.content.clamp_selection(len);
    }

    pub fn toggle_like(&mut self, track: &Track) -> Result<bool, LibraryError> {
        let liked = self.library.toggle_like(track)?;
        self.refresh_playlists();
        if let Some(id) = self.library.liked_songs().map(|p| p.id.clone()) {
            self.refresh_open_playlist(&id);
        }
        Ok(liked)
    }

    pub fn create_playlist(&mut self, name: &str) -> Result<String, LibraryError> {
        let id = self.library.create_playlist(name)?.id.clone();
        self.refresh_playlists();
        Ok(id)
    }

    pub fn add_to_playlist(&mut self, playlist_id: &str, track: Track) -> Result<bool, LibraryError> {
        let added = self.library.add_track(playlist_id, track)?;
        self.refresh_playlists();
        self.refresh_open_playlist(playlist_id);
        Ok(added)
    }

    pub fn remove_from_playlist(&mut self, playlist_id: &str, video_id: &str) -> Result<bool, LibraryError> {
        let removed = self.library.remove_track(playlist_id, video_id)?;
        self.refresh_playlists();
        self.refresh_open_playlist(playlist_id);
        Ok(removed)
    }

    pub fn delete_playlist(&mut self, playlist_id: &str) -> Result<(), LibraryError> {
        self.library.delete_playlist(playlist_id)?;
        self.refresh_playlists();
        if matches!(&self.content.view, ContentView::Playlist { playlist, .. } if playlist.id == playlist_id)
        {
            self.content.replace(ContentView::Empty);
            self.content.back();
        }
        Ok(())
    }

    /// Id of the local playlist shown in the content area, if any
    pub fn open_local_playlist(&self) -> Option<String> {
        match &self.content.view {
            ContentView::Playlist { playlist, .. } if playlist.source == PlaylistSource::Local => {
                Some(playlist.id.clone())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_model(name: &str) -> AppModel {
        let dir = std::env::temp_dir().join(format!("synapse-model-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut library = Library::open(dir.join("library.json")).unwrap();
        library.ensure_profile("tester").unwrap();
        AppModel::new(AppConfig::default(), Settings::default(), library)
    }

    fn track(id: &str) -> Track {
        Track {
            video_id: id.to_string(),
            title: id.to_string(),
            artist: "Artist".to_string(),
            channel_id: "UC1".to_string(),
            thumbnail: String::new(),
            duration_secs: 180,
        }
    }

    #[test]
    fn play_loads_the_track() {
        let mut model = test_model("play");
        let context = vec![track("a"), track("b")];
        assert_eq!(model.play(track("b"), context), PlayerSync::Load("b".to_string()));
        assert_eq!(model.playback_info().queue_position, Some((2, 2)));
    }

    #[test]
    fn toggle_maps_to_pause_and_play() {
        let mut model = test_model("toggle");
        assert_eq!(model.toggle_play(), PlayerSync::Nothing);

        model.play(track("a"), vec![]);
        assert_eq!(model.toggle_play(), PlayerSync::Pause);
        assert_eq!(model.toggle_play(), PlayerSync::Play);
    }

    #[test]
    fn next_past_end_stops() {
        let mut model = test_model("next");
        model.play(track("a"), vec![track("a"), track("b")]);
        assert_eq!(model.next(), PlayerSync::Load("b".to_string()));
        assert_eq!(model.next(), PlayerSync::Stop);
        assert!(model.playback_info().track.is_none());
    }

    #[test]
    fn previous_at_start_does_nothing() {
        let mut model = test_model("previous");
        model.play(track("a"), vec![track("a"), track("b")]);
        model.toggle_play();
        assert_eq!(model.previous(), PlayerSync::Nothing);
    }

    #[test]
    fn enqueue_into_empty_queue_loads() {
        let mut model = test_model("enqueue");
        assert_eq!(model.add_to_queue(track("a")), PlayerSync::Load("a".to_string()));
        assert_eq!(model.add_to_queue(track("b")), PlayerSync::Nothing);
        assert_eq!(model.add_to_queue(track("b")), PlayerSync::Nothing);
        assert_eq!(model.queue.tracks().len(), 2);
    }

    #[test]
    fn widget_pause_is_mirrored_into_queue() {
        let mut model = test_model("mirror");
        model.apply_widget_event(&WidgetEvent::Ready);
        model.play(track("a"), vec![]);
        model.apply_widget_event(&WidgetEvent::StateChanged(PlaybackState::Playing));
        model.apply_widget_event(&WidgetEvent::StateChanged(PlaybackState::Paused));
        assert!(!model.queue.is_playing());
    }

    #[test]
    fn ended_event_advances_in_one_step() {
        let mut model = test_model("ended-step");
        model.widget_event(&WidgetEvent::Ready);
        model.play(track("a"), vec![track("a"), track("b")]);
        model.widget_event(&WidgetEvent::StateChanged(PlaybackState::Playing));

        assert_eq!(model.widget_event(&WidgetEvent::Ended), PlayerSync::Load("b".to_string()));
        assert_eq!(model.queue.index(), Some(1));
        assert_eq!(model.widget_event(&WidgetEvent::Ended), PlayerSync::Nothing);
        assert_eq!(model.queue.index(), Some(1));
    }

    #[test]
    fn load_failure_skips_even_before_playing() {
        let mut model = test_model("load-failure");
        model.widget_event(&WidgetEvent::Ready);
        model.play(track("a"), vec![track("a"), track("b")]);
        model.widget_event(&WidgetEvent::StateChanged(PlaybackState::Buffering));

        let sync = model.widget_event(&WidgetEvent::Error("loading failed".to_string()));
        assert_eq!(sync, PlayerSync::Load("b".to_string()));
        assert_eq!(model.ui.error_message.as_deref(), Some("loading failed"));
    }

    #[test]
    fn failure_with_empty_queue_only_reports() {
        let mut model = test_model("failure-empty");
        model.widget_event(&WidgetEvent::Ready);
        let sync = model.widget_event(&WidgetEvent::Error("no file".to_string()));
        assert_eq!(sync, PlayerSync::Nothing);
        assert!(model.has_error());
        assert!(model.queue.current().is_none());
    }

    #[test]
    fn queue_view_selection_uses_queue_as_context() {
        let mut model = test_model("queue-view");
        model.play(track("a"), vec![track("a"), track("b"), track("c")]);
        model.show_content(ContentView::Queue);
        model.move_selection_down();
        model.move_selection_down();

        let (selected, context) = model.selected_track().unwrap();
        assert_eq!(selected.video_id, "c");
        assert_eq!(context.len(), 3);
    }

    #[test]
    fn errors_clear_after_timeout() {
        let mut model = test_model("errors");
        model.set_error("boom".to_string());
        model.auto_clear_old_errors();
        assert!(model.has_error());

        model.ui.error_timestamp = Some(Instant::now() - std::time::Duration::from_secs(6));
        model.auto_clear_old_errors();
        assert!(!model.has_error());
    }

    #[test]
    fn liked_songs_lead_the_sidebar() {
        let mut model = test_model("sidebar");
        model.create_playlist("Mix").unwrap();
        assert_eq!(model.ui.playlists.len(), 2);
        assert_eq!(model.ui.playlists[0].name, crate::model::LIKED_SONGS_NAME);
    }

    #[test]
    fn external_playlists_follow_the_setting() {
        let mut model = test_model("external");
        model.set_external_playlists(vec![Playlist {
            id: "PL1".to_string(),
            name: "Remote".to_string(),
            owner_id: String::new(),
            owner_name: String::new(),
            tracks: vec![],
            track_count: 3,
            source: PlaylistSource::YouTube,
            kind: Default::default(),
        }]);
        assert_eq!(model.ui.playlists.len(), 1);
        model.toggle_external_playlists();
        assert_eq!(model.ui.playlists.len(), 2);
    }

    #[test]
    fn liking_updates_open_liked_view() {
        let mut model = test_model("like-view");
        let liked = model.library.liked_songs().cloned().unwrap();
        model.show_content(ContentView::Playlist {
            tracks: liked.tracks.clone(),
            playlist: liked,
            next_page_token: None,
        });
        model.toggle_like(&track("a")).unwrap();
        assert_eq!(model.content_len(), 1);
        assert!(model.playback_info().track.is_none());
    }

    #[test]
    fn paged_view_asks_for_more_at_the_end() {
        let mut model = test_model("paging");
        model.show_content(ContentView::Channel {
            details: Default::default(),
            tracks: vec![track("a"), track("b")],
            next_page_token: Some("next".to_string()),
        });
        assert!(model.pending_page().is_none());
        model.move_selection_down();
        assert_eq!(model.pending_page().map(|(_, t)| t), Some("next".to_string()));
    }
}
