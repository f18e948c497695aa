//! Playback-related types shared by the controller and the view

use crate::audio::ClipProgress;
use super::track::Track;

/// Transport state of the playback controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No clip loaded
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Read-only snapshot the view renders from
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub current_index: Option<usize>,
    pub track: Option<Track>,
    pub status: PlaybackStatus,
    pub progress: ClipProgress,
}

impl PlaybackInfo {
    /// Status of a given row; every row but the current one is idle
    pub fn status_of(&self, index: usize) -> PlaybackStatus {
        if self.current_index == Some(index) {
            self.status
        } else {
            PlaybackStatus::Idle
        }
    }
}
