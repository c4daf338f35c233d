//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackInfo, QueueStatus};
use crate::player::WidgetState;
use super::utils::{Palette, format_duration};

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo, palette: Palette) {
    let status_text = match (&playback.track, playback.status) {
        (None, _) => " Nothing playing".to_string(),
        (Some(track), status) => {
            let icon = match (status, playback.widget_state) {
                (_, WidgetState::Idle) => "…",
                (QueueStatus::Playing, _) => "▶",
                _ => "⏸",
            };
            let liked = if playback.liked { " ♥" } else { "" };
            format!(" {} {} | {}{}", icon, track.title, track.artist, liked)
        }
    };

    let position = playback
        .queue_position
        .map(|(current, total)| format!("{}/{} | ", current, total))
        .unwrap_or_default();
    let mode = if playback.audio_only { "Audio" } else { "Video" };
    let controls_info = format!(" {}{} | Vol: {}% ", position, mode, playback.volume);

    let time_str = format!(
        "{} / {}",
        format_duration(playback.progress_secs as u32),
        format_duration(playback.duration_secs as u32)
    );

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned())
                .border_style(palette.border(false)),
        )
        .gauge_style(Style::default().fg(palette.accent))
        .ratio(playback.ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}
