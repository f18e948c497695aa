//! Audio module - preview clip playback
//!
//! The playback controller only sees the [`AudioBackend`] / [`ClipHandle`]
//! seam. The real backend downloads a preview, decodes it with Symphonia and
//! streams it through cpal on a worker thread:
//!
//! - `clip`: backend, clip handle and the worker thread
//! - `decoder`: in-memory MP3 decoding to interleaved f32
//! - `output`: cpal output stream fed through a ring buffer
//! - `convert`: channel mapping and sample rate conversion

mod clip;
mod convert;
mod decoder;
mod output;

use tokio::sync::mpsc;

use crate::error::PlaybackError;

pub use clip::CpalBackend;

/// Monotonic number identifying one acquired clip
pub type ClipId = u64;

/// Notifications sent from a clip worker back to the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The clip played to its natural end
    Finished { clip: ClipId },
    /// The clip could not be downloaded, decoded or played
    Failed { clip: ClipId, error: String },
}

pub type PlayerEventSender = mpsc::UnboundedSender<PlayerEvent>;
pub type PlayerEventChannel = mpsc::UnboundedReceiver<PlayerEvent>;

pub fn player_event_channel() -> (PlayerEventSender, PlayerEventChannel) {
    mpsc::unbounded_channel()
}

/// Elapsed time and (when known) total length of a clip
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipProgress {
    pub position_ms: u32,
    pub duration_ms: Option<u32>,
}

/// Source of playable clips.
///
/// `open` acquires a live resource that starts playing immediately. Failures
/// that can be detected up front are returned; anything that happens later on
/// the worker is reported as [`PlayerEvent::Failed`].
pub trait AudioBackend: Send + Sync {
    fn open(&self, clip: ClipId, url: &str) -> Result<Box<dyn ClipHandle>, PlaybackError>;
}

/// A live clip. Dropping the handle releases the underlying resource.
pub trait ClipHandle: Send {
    fn pause(&mut self);
    fn resume(&mut self);
    fn progress(&self) -> ClipProgress;
}

#[cfg(test)]
pub mod testing {
    //! In-memory backend that records every acquisition and release

    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::{AudioBackend, ClipHandle, ClipId, ClipProgress};
    use crate::error::PlaybackError;

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum BackendCall {
        Open { clip: ClipId, url: String },
        Pause { clip: ClipId },
        Resume { clip: ClipId },
        Release { clip: ClipId },
    }

    #[derive(Clone, Default)]
    pub struct FakeBackend {
        calls: Arc<Mutex<Vec<BackendCall>>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<BackendCall> {
            self.calls.lock().clone()
        }

        pub fn clear(&self) {
            self.calls.lock().clear();
        }

        pub fn live_clips(&self) -> usize {
            let calls = self.calls.lock();
            let opened = calls.iter().filter(|c| matches!(c, BackendCall::Open { .. })).count();
            let released = calls.iter().filter(|c| matches!(c, BackendCall::Release { .. })).count();
            opened - released
        }

        /// Id of the most recently opened clip
        pub fn last_clip(&self) -> Option<ClipId> {
            self.calls.lock().iter().rev().find_map(|c| match c {
                BackendCall::Open { clip, .. } => Some(*clip),
                _ => None,
            })
        }
    }

    impl AudioBackend for FakeBackend {
        fn open(&self, clip: ClipId, url: &str) -> Result<Box<dyn ClipHandle>, PlaybackError> {
            if url.is_empty() {
                return Err(PlaybackError::InvalidUrl(url.to_string()));
            }
            self.calls.lock().push(BackendCall::Open {
                clip,
                url: url.to_string(),
            });
            Ok(Box::new(FakeClip {
                clip,
                calls: self.calls.clone(),
            }))
        }
    }

    struct FakeClip {
        clip: ClipId,
        calls: Arc<Mutex<Vec<BackendCall>>>,
    }

    impl ClipHandle for FakeClip {
        fn pause(&mut self) {
            self.calls.lock().push(BackendCall::Pause { clip: self.clip });
        }

        fn resume(&mut self) {
            self.calls.lock().push(BackendCall::Resume { clip: self.clip });
        }

        fn progress(&self) -> ClipProgress {
            ClipProgress::default()
        }
    }

    impl Drop for FakeClip {
        fn drop(&mut self) {
            self.calls.lock().push(BackendCall::Release { clip: self.clip });
        }
    }
}
