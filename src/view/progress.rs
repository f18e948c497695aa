//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlaybackInfo, PlaybackStatus};
use super::utils::format_duration;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let status_text = match (&playback.track, playback.status) {
        (None, _) => " No track playing".to_string(),
        (Some(track), PlaybackStatus::Playing) => {
            format!(" ▶ {} | {} ({})", track.title, track.artist.name, track.album.title)
        }
        (Some(track), PlaybackStatus::Paused) => {
            format!(" ⏸  {} | {} ({})", track.title, track.artist.name, track.album.title)
        }
        (Some(track), PlaybackStatus::Idle) => {
            format!(" ■ {} | {} ({})", track.title, track.artist.name, track.album.title)
        }
    };

    let position_ms = playback.progress.position_ms;
    let duration_ms = playback.progress.duration_ms.unwrap_or(0);

    let time_str = format!("{} / {}", format_duration(position_ms), format_duration(duration_ms));

    let progress_ratio = if duration_ms > 0 {
        (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let position_text = match playback.current_index {
        Some(index) => format!(" Track {} ", index + 1),
        None => " Preview ".to_string(),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(position_text).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
