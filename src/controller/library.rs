//! Installing the result of the one search call

use std::sync::Arc;
use tokio::sync::oneshot;

use crate::error::FetchError;
use crate::model::Playlist;

use super::AppController;

impl AppController {
    /// Wait for the background fetch and install its playlist.
    ///
    /// A failed fetch is never retried; the list shows the failure and the
    /// playback controller stays idle with an empty playlist.
    pub async fn load_tracks(&self, pending: oneshot::Receiver<Result<Playlist, FetchError>>) {
        let result = match pending.await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Fetch task ended without delivering a result");
                self.model.lock().await.set_load_failed().await;
                return;
            }
        };

        match result {
            Ok(playlist) => {
                let playlist = Arc::new(playlist);
                tracing::info!(tracks = playlist.len(), "Playlist loaded");
                self.playback.lock().await.set_playlist(playlist.clone());
                self.model.lock().await.set_playlist(playlist).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load tracks");
                let model = self.model.lock().await;
                model.set_load_failed().await;
                model.set_error(Self::format_fetch_error(&e)).await;
            }
        }
    }
}
