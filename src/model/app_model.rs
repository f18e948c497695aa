//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::track::Playlist;
use super::types::{LoadState, UiState};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Presentation state: what is listed, what is highlighted, which popups are up
pub struct AppModel {
    playlist: Arc<Mutex<Arc<Playlist>>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new() -> Self {
        Self {
            playlist: Arc::new(Mutex::new(Arc::new(Playlist::default()))),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Playlist
    // ========================================================================

    pub async fn set_playlist(&self, playlist: Arc<Playlist>) {
        *self.playlist.lock().await = playlist;
        let mut state = self.ui_state.lock().await;
        state.load_state = LoadState::Loaded;
        state.selected = 0;
    }

    pub async fn set_load_failed(&self) {
        self.ui_state.lock().await.load_state = LoadState::Failed;
    }

    pub async fn get_playlist(&self) -> Arc<Playlist> {
        self.playlist.lock().await.clone()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub async fn move_selection_up(&self) {
        let mut state = self.ui_state.lock().await;
        state.selected = state.selected.saturating_sub(1);
    }

    pub async fn move_selection_down(&self) {
        let len = self.playlist.lock().await.len();
        let mut state = self.ui_state.lock().await;
        if state.selected < len.saturating_sub(1) {
            state.selected += 1;
        }
    }

    pub async fn select(&self, index: usize) {
        let len = self.playlist.lock().await.len();
        if index < len {
            self.ui_state.lock().await.selected = index;
        }
    }

    pub async fn get_selected(&self) -> Option<usize> {
        let len = self.playlist.lock().await.len();
        let selected = self.ui_state.lock().await.selected;
        (selected < len).then_some(selected)
    }

    // ========================================================================
    // UI State
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed() > ERROR_DISPLAY_TIME {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new()
    }
}
