//! Main content area rendering (track lists, channel, feed, queue, history)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{ActiveSection, AppModel, ChannelDetails, ChannelFeed, ContentView, Library, PlaylistSource, Track};
use super::utils::{Palette, format_duration, render_scrollable_list, track_column_widths, truncate_string};

/// Everything a track row needs besides the track
struct Rows<'a> {
    palette: Palette,
    focused: bool,
    selected: usize,
    playing_id: Option<&'a str>,
    library: &'a Library,
}

pub fn render_main_content(frame: &mut Frame, area: Rect, model: &AppModel, palette: Palette) {
    let content = &model.content;
    let focused = model.ui.active_section == ActiveSection::MainContent;
    let border_style = palette.border(focused);
    let title = format!(" {} ", content.view.title());

    if content.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(palette.highlight))
            .block(Block::default().borders(Borders::ALL).title(title).border_style(border_style));
        frame.render_widget(loading, area);
        return;
    }

    let rows = Rows {
        palette,
        focused,
        selected: content.selected_index,
        playing_id: model.queue.current().map(|t| t.video_id.as_str()),
        library: &model.library,
    };

    match &content.view {
        ContentView::Empty => {
            let hint = Paragraph::new(
                "Type in search and press Enter to find music\n\nUse Tab to move between sections\nUse ↑/↓ to select items\nPress Enter to open or play\nPress ? for all keys",
            )
            .style(Style::default().fg(palette.muted))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
            frame.render_widget(hint, area);
        }
        ContentView::Home { tracks } | ContentView::SearchResults { tracks, .. } => {
            render_track_list(frame, area, &title, tracks, &rows, None);
        }
        ContentView::Channel { details, tracks, next_page_token } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(5), Constraint::Min(0)])
                .split(area);
            render_channel_header(frame, chunks[0], details, palette);
            let footer = next_page_token.as_ref().map(|_| " more below ");
            render_track_list(frame, chunks[1], " Uploads ", tracks, &rows, footer);
        }
        ContentView::Playlist { playlist, tracks, next_page_token } => {
            let source = match playlist.source {
                PlaylistSource::Local => "local",
                PlaylistSource::YouTube => "linked account",
            };
            let title = format!(" {} ({} tracks, {}) ", playlist.name, playlist.track_count, source);
            let footer = next_page_token.as_ref().map(|_| " more below ");
            render_track_list(frame, area, &title, tracks, &rows, footer);
        }
        ContentView::Subscriptions { feeds } => render_feed(frame, area, feeds, &rows),
        ContentView::Queue => render_queue(frame, area, model, &rows),
        ContentView::SearchHistory { entries } => {
            let mut items: Vec<ListItem> = entries
                .iter()
                .enumerate()
                .map(|(i, query)| {
                    ListItem::new(format!(" {}", query)).style(palette.row(i == rows.selected, focused))
                })
                .collect();
            if items.is_empty() {
                items.push(ListItem::new(" No searches yet").style(Style::default().fg(palette.muted)));
            }
            let block = Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(" Enter: search again  Del: clear ")
                .padding(Padding::horizontal(1))
                .border_style(border_style);
            render_scrollable_list(frame, area, items, rows.selected, block);
        }
    }
}

fn render_channel_header(frame: &mut Frame, area: Rect, details: &ChannelDetails, palette: Palette) {
    let mut stats = Vec::new();
    if let Some(subscribers) = details.subscriber_count {
        stats.push(format!("{} subscribers", subscribers));
    }
    if let Some(videos) = details.video_count {
        stats.push(format!("{} videos", videos));
    }
    let description = details.description.lines().next().unwrap_or_default();
    let text = format!("{}\n{}", stats.join(" · "), description);

    let header = Paragraph::new(text)
        .style(Style::default().fg(palette.text))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", details.title))
                .padding(Padding::horizontal(1))
                .border_style(palette.border(false)),
        );
    frame.render_widget(header, area);
}

fn header_item(palette: Palette, widths: (usize, usize, usize, usize, usize)) -> ListItem<'static> {
    let (num_width, _, title_width, artist_width, _) = widths;
    ListItem::new(format!(
        " {:<num_width$}  {}  {:<title_width$}  {:<artist_width$}  {}",
        "#", "  ", "Title", "Channel", "Duration",
    ))
    .style(Style::default().fg(palette.highlight).add_modifier(Modifier::BOLD))
}

fn track_item(rows: &Rows, index: usize, number: usize, track: &Track, widths: (usize, usize, usize, usize, usize)) -> ListItem<'static> {
    let (num_width, _, title_width, artist_width, _) = widths;
    let is_playing = rows.playing_id == Some(track.video_id.as_str());
    let style = if index == rows.selected && rows.focused {
        rows.palette.row(true, true)
    } else if is_playing {
        Style::default().fg(rows.palette.highlight).add_modifier(Modifier::BOLD)
    } else {
        rows.palette.row(index == rows.selected, false)
    };

    let liked = if rows.library.is_liked(&track.video_id) { "♥ " } else { "  " };
    let marker = if is_playing { "▶" } else { " " };
    let duration = if track.duration_secs > 0 {
        format_duration(track.duration_secs)
    } else {
        "-".to_string()
    };

    ListItem::new(format!(
        "{}{:<num_width$}  {}  {}  {}  {}",
        marker,
        number,
        liked,
        truncate_string(&track.title, title_width),
        truncate_string(&track.artist, artist_width),
        duration,
    ))
    .style(style)
}

fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    tracks: &[Track],
    rows: &Rows,
    footer: Option<&str>,
) {
    let widths = track_column_widths(area.width.saturating_sub(4) as usize, tracks.len());
    let mut items = vec![header_item(rows.palette, widths)];
    items.extend(
        tracks
            .iter()
            .enumerate()
            .map(|(i, track)| track_item(rows, i, i + 1, track, widths)),
    );
    if tracks.is_empty() {
        items.push(ListItem::new("  Nothing here").style(Style::default().fg(rows.palette.muted)));
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .padding(Padding::horizontal(1))
        .border_style(rows.palette.border(rows.focused));
    if let Some(footer) = footer {
        block = block.title_bottom(footer.to_string());
    }

    render_scrollable_list(frame, area, items, rows.selected + 1, block); // +1 for header
}

/// Feed rows interleave one heading per channel with its tracks
fn render_feed(frame: &mut Frame, area: Rect, feeds: &[ChannelFeed], rows: &Rows) {
    let total: usize = feeds.iter().map(|f| f.tracks.len()).sum();
    let widths = track_column_widths(area.width.saturating_sub(4) as usize, total);

    let mut items = Vec::new();
    let mut flat_index = 0;
    let mut selected_row = 0;
    for feed in feeds {
        items.push(
            ListItem::new(format!(" {}", feed.channel.title))
                .style(Style::default().fg(rows.palette.highlight).add_modifier(Modifier::BOLD)),
        );
        for (i, track) in feed.tracks.iter().enumerate() {
            if flat_index == rows.selected {
                selected_row = items.len();
            }
            items.push(track_item(rows, flat_index, i + 1, track, widths));
            flat_index += 1;
        }
    }
    if items.is_empty() {
        items.push(
            ListItem::new(" No recent uploads from your subscriptions")
                .style(Style::default().fg(rows.palette.muted)),
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Subscriptions ")
        .padding(Padding::horizontal(1))
        .border_style(rows.palette.border(rows.focused));
    render_scrollable_list(frame, area, items, selected_row, block);
}

fn render_queue(frame: &mut Frame, area: Rect, model: &AppModel, rows: &Rows) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Now playing
            Constraint::Min(0),    // Queue
        ])
        .split(area);

    let now_playing = match model.queue.current() {
        Some(track) => format!("{}  -  {}", track.title, track.artist),
        None => "Nothing playing".to_string(),
    };
    let now_playing = Paragraph::new(now_playing)
        .style(Style::default().fg(rows.palette.highlight))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Now Playing ")
                .padding(Padding::horizontal(1))
                .border_style(rows.palette.border(rows.focused)),
        );
    frame.render_widget(now_playing, chunks[0]);

    let tracks = model.queue.tracks();
    let widths = track_column_widths(chunks[1].width.saturating_sub(4) as usize, tracks.len());
    let mut items = vec![header_item(rows.palette, widths)];
    items.extend(
        tracks
            .iter()
            .enumerate()
            .map(|(i, track)| track_item(rows, i, i + 1, track, widths)),
    );
    if tracks.is_empty() {
        items.push(ListItem::new("  Queue is empty").style(Style::default().fg(rows.palette.muted)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Queue ({}) ", model.queue.upcoming().len()))
        .padding(Padding::horizontal(1))
        .border_style(rows.palette.border(rows.focused));
    render_scrollable_list(frame, chunks[1], items, rows.selected + 1, block);
}
