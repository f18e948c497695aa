//! Playback controller and the playback actions of the app controller

use std::sync::Arc;

use crate::audio::{AudioBackend, ClipHandle, ClipId, PlayerEvent};
use crate::error::PlaybackError;
use crate::model::{PlaybackInfo, PlaybackStatus, Playlist};

use super::AppController;

/// Owns the current position in the playlist and the one live clip.
///
/// Invariants: `current_index` is `None` or a valid playlist index, and at
/// most one clip handle exists. Every new clip is acquired only after the
/// previous handle has been dropped.
pub struct PlaybackController {
    playlist: Arc<Playlist>,
    backend: Box<dyn AudioBackend>,
    current_index: Option<usize>,
    status: PlaybackStatus,
    clip: Option<Box<dyn ClipHandle>>,
    /// Id of the most recently acquired clip; events for older ids are stale
    clip_id: ClipId,
}

impl PlaybackController {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            playlist: Arc::new(Playlist::default()),
            backend,
            current_index: None,
            status: PlaybackStatus::Idle,
            clip: None,
            clip_id: 0,
        }
    }

    /// Install the fetched playlist. Anything playing from a previous list stops.
    pub fn set_playlist(&mut self, playlist: Arc<Playlist>) {
        self.stop();
        self.playlist = playlist;
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Release the current clip and start track `index` from the beginning
    pub fn select_track(&mut self, index: usize) -> Result<(), PlaybackError> {
        let Some(track) = self.playlist.get(index) else {
            tracing::warn!(index, len = self.playlist.len(), "Ignoring selection outside the playlist");
            return Ok(());
        };
        let url = track.preview_url.clone();

        self.release();
        self.clip_id += 1;
        self.current_index = Some(index);

        match self.backend.open(self.clip_id, &url) {
            Ok(clip) => {
                self.clip = Some(clip);
                self.status = PlaybackStatus::Playing;
                tracing::debug!(index, clip = self.clip_id, "Track selected");
                Ok(())
            }
            Err(e) => {
                self.status = PlaybackStatus::Idle;
                Err(e)
            }
        }
    }

    /// Play/pause button of row `index`
    pub fn toggle(&mut self, index: usize) -> Result<(), PlaybackError> {
        if self.current_index != Some(index) {
            return self.select_track(index);
        }
        match self.status {
            PlaybackStatus::Playing => {
                self.pause();
                Ok(())
            }
            PlaybackStatus::Paused => {
                self.resume();
                Ok(())
            }
            PlaybackStatus::Idle => self.select_track(index),
        }
    }

    /// Global play/pause. `fallback` is played when nothing is loaded.
    pub fn toggle_playback(&mut self, fallback: Option<usize>) -> Result<(), PlaybackError> {
        match self.status {
            PlaybackStatus::Playing => {
                self.pause();
                Ok(())
            }
            PlaybackStatus::Paused => {
                self.resume();
                Ok(())
            }
            PlaybackStatus::Idle => match self.current_index.or(fallback) {
                Some(index) => self.select_track(index),
                None => Ok(()),
            },
        }
    }

    pub fn next(&mut self) -> Result<(), PlaybackError> {
        let len = self.playlist.len();
        if len == 0 {
            return Ok(());
        }
        let index = self.current_index.map_or(0, |i| (i + 1) % len);
        self.select_track(index)
    }

    pub fn previous(&mut self) -> Result<(), PlaybackError> {
        let len = self.playlist.len();
        if len == 0 {
            return Ok(());
        }
        let index = self.current_index.map_or(len - 1, |i| (i + len - 1) % len);
        self.select_track(index)
    }

    /// Apply a notification from a clip worker
    pub fn handle_event(&mut self, event: PlayerEvent) -> Result<(), PlaybackError> {
        match event {
            PlayerEvent::Finished { clip } if self.is_live(clip) => {
                tracing::debug!(clip, "Clip finished, advancing");
                self.next()
            }
            PlayerEvent::Failed { clip, error } if self.is_live(clip) => {
                self.release();
                self.status = PlaybackStatus::Idle;
                Err(PlaybackError::Clip(error))
            }
            stale => {
                tracing::debug!(?stale, "Ignoring event from a released clip");
                Ok(())
            }
        }
    }

    /// Release the clip and forget the position
    pub fn stop(&mut self) {
        self.release();
        self.current_index = None;
        self.status = PlaybackStatus::Idle;
    }

    pub fn info(&self) -> PlaybackInfo {
        PlaybackInfo {
            current_index: self.current_index,
            track: self.current_index.and_then(|i| self.playlist.get(i)).cloned(),
            status: self.status,
            progress: self.clip.as_ref().map(|clip| clip.progress()).unwrap_or_default(),
        }
    }

    fn is_live(&self, clip: ClipId) -> bool {
        clip == self.clip_id && self.clip.is_some()
    }

    fn pause(&mut self) {
        if let Some(clip) = self.clip.as_mut() {
            clip.pause();
            self.status = PlaybackStatus::Paused;
        }
    }

    fn resume(&mut self) {
        if let Some(clip) = self.clip.as_mut() {
            clip.resume();
            self.status = PlaybackStatus::Playing;
        }
    }

    fn release(&mut self) {
        if let Some(clip) = self.clip.take() {
            drop(clip);
            tracing::trace!(clip = self.clip_id, "Clip handle dropped");
        }
    }
}

impl AppController {
    /// Play/pause button of a specific row
    pub async fn toggle_track(&self, index: usize) {
        let result = self.playback.lock().await.toggle(index);
        self.after_playback_action(result).await;
    }

    pub async fn toggle_playback(&self) {
        let fallback = self.model.lock().await.get_selected().await;
        let result = self.playback.lock().await.toggle_playback(fallback);
        self.after_playback_action(result).await;
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        let result = self.playback.lock().await.next();
        self.after_playback_action(result).await;
    }

    pub async fn previous_track(&self) {
        tracing::debug!("Skipping to previous track");
        let result = self.playback.lock().await.previous();
        self.after_playback_action(result).await;
    }

    pub async fn stop_playback(&self) {
        self.playback.lock().await.stop();
        tracing::info!("Playback stopped");
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        self.playback.lock().await.info()
    }

    /// Keep the highlight on the playing row and surface failures
    pub(crate) async fn after_playback_action(&self, result: Result<(), PlaybackError>) {
        let info = self.get_playback_info().await;
        let model = self.model.lock().await;

        if let Some(index) = info.current_index {
            model.select(index).await;
        }

        match result {
            Ok(()) => {
                if let Some(track) = &info.track {
                    tracing::info!(
                        index = info.current_index,
                        title = %track.title,
                        status = ?info.status,
                        "Playback updated"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, index = info.current_index, "Preview could not be played");
                model.set_error(Self::format_error(&e)).await;
            }
        }
    }
}
