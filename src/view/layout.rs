//! Layout rendering (top bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, AppModel, LibraryItem, PlaylistSource};
use super::utils::Palette;

pub fn render_top_bar(frame: &mut Frame, area: Rect, model: &AppModel, palette: Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(28), // Profile
        ])
        .split(area);

    let focused = model.ui.active_section == ActiveSection::Search;
    let search_style = if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.text)
    };

    let search_text = if model.ui.search_query.is_empty() && !focused {
        "Press / to search..."
    } else {
        &model.ui.search_query
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(palette.border(focused)),
    );
    frame.render_widget(search, chunks[0]);

    let profile = match model.library.user() {
        Some(user) if user.linked_token.is_some() => format!("{} (linked)", user.display_name),
        Some(user) => user.display_name.clone(),
        None => "No profile".to_string(),
    };
    let profile = Paragraph::new(profile)
        .style(Style::default().fg(palette.highlight))
        .block(Block::default().borders(Borders::ALL).title(" Profile ").border_style(palette.border(false)));
    frame.render_widget(profile, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, model: &AppModel, palette: Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(LibraryItem::ALL.len() as u16 + 2),
            Constraint::Min(0), // Playlists fill the rest
        ])
        .split(area);

    let ui = &model.ui;
    let library_focused = ui.active_section == ActiveSection::Library;
    let library_items: Vec<ListItem> = LibraryItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            ListItem::new(item.label()).style(palette.row(i == ui.library_selected, library_focused))
        })
        .collect();

    let library = List::new(library_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Library ")
            .padding(Padding::horizontal(1))
            .border_style(palette.border(library_focused)),
    );
    frame.render_widget(library, chunks[0]);

    let playlists_focused = ui.active_section == ActiveSection::Playlists;
    let playlist_items: Vec<ListItem> = ui
        .playlists
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = match item.source {
                PlaylistSource::Local => "",
                PlaylistSource::YouTube => " ↗",
            };
            ListItem::new(format!("{}{} ({})", item.name, marker, item.track_count))
                .style(palette.row(i == ui.playlist_selected, playlists_focused))
        })
        .collect();

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Playlists ")
                .padding(Padding::horizontal(1))
                .border_style(palette.border(playlists_focused)),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui.playlist_selected));

    frame.render_stateful_widget(playlists, chunks[1], &mut list_state);
}
