//! Controller module - Application logic and event handling
//!
//! - `input`: Key event handling
//! - `playback`: The playback controller and the transport actions
//! - `library`: Installing the fetched playlist
//! - `player_events`: Clip worker event listener

mod input;
mod library;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioBackend;
use crate::error::{FetchError, PlaybackError};
use crate::model::AppModel;

pub use playback::PlaybackController;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) playback: Arc<Mutex<PlaybackController>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, backend: Box<dyn AudioBackend>) -> Self {
        Self {
            model,
            playback: Arc::new(Mutex::new(PlaybackController::new(backend))),
        }
    }

    /// Release the live clip; called once on the way out
    pub async fn shutdown(&self) {
        self.model.lock().await.set_should_quit(true).await;
        self.playback.lock().await.stop();
        tracing::info!("Playback controller torn down");
    }

    pub(crate) fn format_error(error: &PlaybackError) -> String {
        match error {
            PlaybackError::InvalidUrl(_) => "This track has no playable preview.".to_string(),
            PlaybackError::Download(_) => "Could not download the preview. Check your connection.".to_string(),
            PlaybackError::Decode(_) => "The preview could not be decoded.".to_string(),
            PlaybackError::Output(_) => "No audio output available.".to_string(),
            other => format!("Error: {}", other),
        }
    }

    pub(crate) fn format_fetch_error(error: &FetchError) -> String {
        match error {
            FetchError::Status(429) => "Rate limited by the search API. Please try again later.".to_string(),
            FetchError::Status(401) | FetchError::Status(403) => {
                "The search API rejected the request. Check RAPIDAPI_KEY.".to_string()
            }
            _ => format!("Could not load tracks: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::FakeBackend;
    use crate::audio::PlayerEvent;
    use crate::config::AppConfig;
    use crate::model::fetch_fixtures::{serve_once, THREE_TRACKS};
    use crate::model::{spawn_fetch, DeezerClient, LoadState, PlaybackStatus};

    fn controller() -> (AppController, FakeBackend) {
        let backend = FakeBackend::new();
        let model = Arc::new(Mutex::new(AppModel::new()));
        (AppController::new(model, Box::new(backend.clone())), backend)
    }

    fn client_for(endpoint: String) -> DeezerClient {
        let config = AppConfig {
            endpoint,
            ..AppConfig::default()
        };
        DeezerClient::new(&config).expect("client")
    }

    #[tokio::test]
    async fn fetch_play_advance_and_go_back() {
        let (controller, backend) = controller();
        let endpoint = serve_once("200 OK", THREE_TRACKS).await;

        controller.load_tracks(spawn_fetch(client_for(endpoint), "eminem".to_string())).await;
        assert_eq!(controller.model.lock().await.get_ui_state().await.load_state, LoadState::Loaded);

        controller.toggle_track(0).await;
        let info = controller.get_playback_info().await;
        assert_eq!(info.current_index, Some(0));
        assert_eq!(info.status, PlaybackStatus::Playing);

        let clip = backend.last_clip().expect("clip");
        controller.handle_player_event(PlayerEvent::Finished { clip }).await;
        let info = controller.get_playback_info().await;
        assert_eq!(info.current_index, Some(1));
        assert_eq!(info.track.map(|t| t.title), Some("Two".to_string()));

        controller.previous_track().await;
        let info = controller.get_playback_info().await;
        assert_eq!(info.current_index, Some(0));
        assert_eq!(info.status, PlaybackStatus::Playing);
        assert_eq!(backend.live_clips(), 1);

        // The highlight follows the playing row
        assert_eq!(controller.model.lock().await.get_selected().await, Some(0));
    }

    #[tokio::test]
    async fn server_error_leaves_everything_idle() {
        let (controller, backend) = controller();
        let endpoint = serve_once("500 Internal Server Error", "{}").await;

        controller.load_tracks(spawn_fetch(client_for(endpoint), "eminem".to_string())).await;

        let model = controller.model.lock().await;
        assert_eq!(model.get_ui_state().await.load_state, LoadState::Failed);
        assert!(model.has_error().await);
        assert!(model.get_playlist().await.is_empty());
        drop(model);

        let info = controller.get_playback_info().await;
        assert_eq!(info.status, PlaybackStatus::Idle);
        assert_eq!(info.current_index, None);

        controller.next_track().await;
        controller.toggle_playback().await;
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn playback_failure_becomes_a_notification() {
        let (controller, backend) = controller();
        let endpoint = serve_once("200 OK", THREE_TRACKS).await;
        controller.load_tracks(spawn_fetch(client_for(endpoint), "eminem".to_string())).await;

        controller.toggle_track(2).await;
        let clip = backend.last_clip().expect("clip");
        controller
            .handle_player_event(PlayerEvent::Failed {
                clip,
                error: "no output".to_string(),
            })
            .await;

        assert!(controller.model.lock().await.has_error().await);
        assert_eq!(controller.get_playback_info().await.status, PlaybackStatus::Idle);
        assert_eq!(backend.live_clips(), 0);
    }

    #[tokio::test]
    async fn shutdown_releases_clip() {
        let (controller, backend) = controller();
        let endpoint = serve_once("200 OK", THREE_TRACKS).await;
        controller.load_tracks(spawn_fetch(client_for(endpoint), "eminem".to_string())).await;
        controller.toggle_track(1).await;

        controller.shutdown().await;

        assert_eq!(backend.live_clips(), 0);
        assert!(controller.model.lock().await.should_quit().await);
    }
}
