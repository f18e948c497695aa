//! Track card rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

use crate::model::{LoadState, PlaybackInfo, PlaybackStatus, Playlist, Track, UiState};
use super::utils::truncate_string;

pub fn render_library(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    playlist: &Playlist,
    playback: &PlaybackInfo,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tracks ")
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green));

    let placeholder = match ui_state.load_state {
        LoadState::Loading => Some(("Loading...", Color::Yellow)),
        LoadState::Failed => Some(("Could not load tracks", Color::Red)),
        LoadState::Loaded if playlist.is_empty() => Some(("No tracks found", Color::DarkGray)),
        LoadState::Loaded => None,
    };
    if let Some((text, color)) = placeholder {
        let paragraph = Paragraph::new(text).style(Style::default().fg(color)).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let text_width = area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let selected = i == ui_state.selected;
            track_card(track, playback.status_of(i), selected, text_width)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by card styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.selected));

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn track_card(
    track: &Track,
    status: PlaybackStatus,
    selected: bool,
    width: usize,
) -> ListItem<'static> {
    let accent = match (status, selected) {
        (PlaybackStatus::Idle, false) => Color::White,
        (PlaybackStatus::Idle, true) => Color::Cyan,
        _ => Color::Green,
    };
    let border = if selected { "┃ " } else { "  " };
    let border_style = Style::default().fg(accent);
    let label = Style::default().fg(Color::DarkGray);

    let (play_icon, play_style) = match status {
        PlaybackStatus::Playing => (
            "⏸",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        PlaybackStatus::Paused => ("▶", Style::default().fg(Color::Green)),
        PlaybackStatus::Idle => (
            "▶",
            Style::default().fg(Color::Green).add_modifier(Modifier::DIM),
        ),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(border, border_style),
            Span::styled(
                format!("Title: {}", truncate_string(&track.title, width)),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(border, border_style),
            Span::styled(
                format!("Album: {}", truncate_string(&track.album.title, width)),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled(border, border_style),
            Span::styled(
                format!("Artist: {}", truncate_string(&track.artist.name, width)),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled(border, border_style),
            Span::styled(truncate_string(&track.album.cover_url, width), label),
        ]),
        Line::from(vec![
            Span::styled(border, border_style),
            Span::styled("  ⏮   ", Style::default().fg(Color::Gray)),
            Span::styled(play_icon, play_style),
            Span::styled("   ⏭", Style::default().fg(Color::Gray)),
        ]),
        Line::from(""),
    ];

    ListItem::new(Text::from(lines))
}
