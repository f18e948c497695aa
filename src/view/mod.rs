//! View module - UI rendering
//!
//! - `utils`: Shared formatting helpers
//! - `layout`: Header bar
//! - `content`: Track cards
//! - `progress`: Progress bar with transport state
//! - `overlays`: Error notification and help popup

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlaybackInfo, Playlist, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, playlist: &Playlist, query: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Track cards
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        layout::render_header(frame, chunks[0], query, playlist.len());

        content::render_library(frame, chunks[1], ui_state, playlist, playback);

        progress::render_progress_bar(frame, chunks[2], playback);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Album, Artist, LoadState, PlaybackStatus, Track};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn draw(playback: &PlaybackInfo, ui_state: &UiState, playlist: &Playlist) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal
            .draw(|f| AppView::render(f, playback, ui_state, playlist, "eminem"))
            .expect("draw");
        screen_text(&terminal)
    }

    #[test]
    fn shows_loading_placeholder_before_fetch() {
        let text = draw(&PlaybackInfo::default(), &UiState::default(), &Playlist::default());
        assert!(text.contains("Loading..."));
        assert!(text.contains("No track playing"));
    }

    #[test]
    fn shows_failure_instead_of_spinning() {
        let ui_state = UiState {
            load_state: LoadState::Failed,
            ..UiState::default()
        };
        let text = draw(&PlaybackInfo::default(), &ui_state, &Playlist::default());
        assert!(text.contains("Could not load tracks"));
    }

    #[test]
    fn renders_cards_and_current_track() {
        let track = Track {
            id: 7,
            title: "Mockingbird".to_string(),
            preview_url: "https://cdn.example/7.mp3".to_string(),
            album: Album {
                title: "Encore".to_string(),
                cover_url: "https://img.example/7.jpg".to_string(),
            },
            artist: Artist {
                name: "Eminem".to_string(),
            },
            duration: Some(250),
        };
        let playlist = Playlist::new(vec![track.clone()]);
        let ui_state = UiState {
            load_state: LoadState::Loaded,
            ..UiState::default()
        };
        let playback = PlaybackInfo {
            current_index: Some(0),
            track: Some(track),
            status: PlaybackStatus::Playing,
            ..PlaybackInfo::default()
        };

        let text = draw(&playback, &ui_state, &playlist);
        assert!(text.contains("Title: Mockingbird"));
        assert!(text.contains("Album: Encore"));
        assert!(text.contains("Artist: Eminem"));
        assert!(text.contains("Track 1"));
    }
}
