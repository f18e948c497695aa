//! Clip worker event listener

use crate::audio::{PlayerEvent, PlayerEventChannel};

use super::AppController;

impl AppController {
    /// Forward worker notifications onto the controller, one at a time
    pub fn start_player_event_listener(&self, mut event_channel: PlayerEventChannel) {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }
                controller.handle_player_event(event).await;
            }
        });
    }

    pub async fn handle_player_event(&self, event: PlayerEvent) {
        match &event {
            PlayerEvent::Finished { clip } => tracing::debug!(clip, "PlayerEvent::Finished"),
            PlayerEvent::Failed { clip, error } => {
                tracing::debug!(clip, error = %error, "PlayerEvent::Failed")
            }
        }

        let result = self.playback.lock().await.handle_event(event);
        self.after_playback_action(result).await;
    }
}
