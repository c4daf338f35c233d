//! View module - UI rendering
//!
//! - `utils`: colours, formatting, scrollable lists
//! - `layout`: top bar and sidebar
//! - `content`: main content area
//! - `progress`: progress bar
//! - `overlays`: error, popups and blocking screens

mod content;
mod layout;
mod overlays;
mod progress;
mod utils;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{AppModel, Popup};
pub use utils::format_duration;
use utils::Palette;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, model: &AppModel) {
        let palette = Palette::for_theme(model.settings.theme);
        let ui = &model.ui;

        if let Some(screen) = &ui.blocking {
            overlays::render_blocking_screen(frame, screen, palette);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + profile
                Constraint::Min(0),    // Sidebar + content
                Constraint::Length(3), // Progress bar
                Constraint::Length(1), // Status line
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], model, palette);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Sidebar (Library + Playlists)
                Constraint::Percentage(70), // Main content
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], model, palette);
        content::render_main_content(frame, main_chunks[1], model, palette);
        progress::render_progress_bar(frame, chunks[2], &model.playback_info(), palette);
        if let Some(status) = &ui.status_message {
            overlays::render_status_line(frame, chunks[3], status, palette);
        }

        match &ui.popup {
            Some(Popup::Help) => overlays::render_help_popup(frame, palette),
            Some(Popup::PlaylistPicker { track, selected }) => {
                overlays::render_playlist_picker(frame, track, &model.local_playlists(), *selected, palette);
            }
            Some(Popup::CreatePlaylist { name }) => overlays::render_create_playlist(frame, name, palette),
            None => {}
        }

        if let Some(message) = &ui.error_message {
            overlays::render_error_notification(frame, message, palette);
        }
    }
}
