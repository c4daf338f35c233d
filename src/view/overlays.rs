//! Overlay rendering (error notification, popups, blocking screens)

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::model::{BlockingScreen, PlaylistItem, Track};
use super::utils::{Palette, centered_rect};

pub fn render_error_notification(frame: &mut Frame, message: &str, palette: Palette) {
    let area = frame.area();

    let popup_width = 52.min(area.width.saturating_sub(4));
    let inner_width = popup_width.saturating_sub(4).max(1) as usize; // account for borders

    let line_count = message.chars().count().div_ceil(inner_width) as u16;
    let popup_height = 2 + line_count.max(1);
    let popup_area = centered_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let error_widget = Paragraph::new(message.to_string())
        .style(Style::default().fg(palette.error))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.error))
                .title(" Error (Esc to dismiss) ")
                .title_style(Style::default().fg(palette.error).add_modifier(Modifier::BOLD)),
        );

    frame.render_widget(error_widget, popup_area);
}

pub fn render_status_line(frame: &mut Frame, area: Rect, message: &str, palette: Palette) {
    let status = Paragraph::new(format!(" {}", message)).style(Style::default().fg(palette.muted));
    frame.render_widget(status, area);
}

pub fn render_playlist_picker(
    frame: &mut Frame,
    track: &Track,
    playlists: &[PlaylistItem],
    selected: usize,
    palette: Palette,
) {
    let area = frame.area();
    let popup_width = playlists
        .iter()
        .map(|p| p.name.chars().count() + 10)
        .max()
        .unwrap_or(30)
        .clamp(40, 60) as u16;
    let popup_height = playlists.len() as u16 + 2;
    let popup_area = centered_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let already = if playlist.track_count > 0 {
                format!(" ({})", playlist.track_count)
            } else {
                String::new()
            };
            ListItem::new(format!("{}{}", playlist.name, already)).style(palette.row(i == selected, true))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.highlight))
            .title(format!(" Add \"{}\" to (↑↓ Enter Esc) ", track.title))
            .title_style(Style::default().fg(palette.highlight).add_modifier(Modifier::BOLD)),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(selected));

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

pub fn render_create_playlist(frame: &mut Frame, name: &str, palette: Palette) {
    let popup_area = centered_rect(frame.area(), 50, 3);
    frame.render_widget(Clear, popup_area);

    let input = Paragraph::new(format!("{}▏", name))
        .style(Style::default().fg(palette.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent))
                .title(" New playlist (Enter to create, Esc to cancel) "),
        );
    frame.render_widget(input, popup_area);
}

/// Whole-screen panel shown instead of the normal layout
pub fn render_blocking_screen(frame: &mut Frame, screen: &BlockingScreen, palette: Palette) {
    let (title, lines): (&str, Vec<Line>) = match screen {
        BlockingScreen::Diagnostic { problems } => {
            let mut lines = vec![
                Line::from("Synapse cannot reach the video platform with the current configuration."),
                Line::from(""),
            ];
            lines.extend(problems.iter().map(|p| {
                Line::from(Span::styled(format!("  • {}", p), Style::default().fg(palette.error)))
            }));
            lines.extend([
                Line::from(""),
                Line::from("Set `api_key` in the config file or export SYNAPSE_API_KEY."),
                Line::from("`synapse generate-config` writes a starter config file."),
                Line::from("`synapse doctor` checks it."),
            ]);
            (" Configuration problem ", lines)
        }
        BlockingScreen::PermissionGuidance { path } => (
            " Storage not writable ",
            vec![
                Line::from("Synapse could not write its library file:"),
                Line::from(""),
                Line::from(Span::styled(format!("  {}", path), Style::default().fg(palette.highlight))),
                Line::from(""),
                Line::from("Check that the directory exists and is owned by your user,"),
                Line::from("or point SYNAPSE_DATA_DIR at a writable directory."),
                Line::from("Changes to likes and playlists will not be saved until this is fixed."),
            ],
        ),
    };

    let mut lines = lines;
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Enter/Esc to continue, Q to quit",
            Style::default().fg(palette.muted),
        )),
    ]);

    let area = frame.area();
    let popup_area = centered_rect(area, 86, lines.len() as u16 + 2);
    frame.render_widget(Clear, area);

    let panel = Paragraph::new(lines)
        .style(Style::default().fg(palette.text))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.error))
                .title(title)
                .title_style(Style::default().fg(palette.error).add_modifier(Modifier::BOLD)),
        );
    frame.render_widget(panel, popup_area);
}

pub fn render_help_popup(frame: &mut Frame, palette: Palette) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("Enter", "Open / Play"),
        ("Backspace / Esc", "Go back"),
        ("G or /", "Focus search"),
        ("L", "Focus playlists"),
        ("U", "Show queue"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N / P", "Next / Previous track"),
        (", / .", "Seek -10s / +10s"),
        ("+ / -", "Volume up / down"),
        ("", ""),
        ("", "── Tracks ──"),
        ("X", "Like / Unlike"),
        ("K", "Add to queue"),
        ("A", "Add to playlist"),
        ("C", "Go to channel"),
        ("D", "Download audio"),
        ("Delete", "Remove from playlist"),
        ("", ""),
        ("", "── Playlists ──"),
        ("C", "Create playlist"),
        ("Delete", "Delete playlist"),
        ("", ""),
        ("", "── General ──"),
        ("T", "Toggle light / dark"),
        ("V", "Toggle audio only"),
        ("E", "Show linked playlists"),
        ("H or ?", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_area = centered_rect(area, 62, keybindings.len() as u16 + 2);
    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(palette.highlight).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(palette.text)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.highlight))
            .title(" Help (H or Esc to close) ")
            .title_style(Style::default().fg(palette.highlight).add_modifier(Modifier::BOLD)),
    );

    frame.render_widget(help_text, popup_area);
}
