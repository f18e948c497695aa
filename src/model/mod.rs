//! Model module - Application state and data types
//!
//! - `types`: UI state and load state
//! - `track`: Track / Playlist records and the search response envelope
//! - `playback`: Playback status and the snapshot the view renders
//! - `deezer_client`: Search API client and the one-shot fetch
//! - `app_model`: Main application model with state management methods

mod types;
mod track;
mod playback;
mod deezer_client;
mod app_model;

pub use types::{LoadState, UiState};

pub use track::{Album, Artist, Playlist, Track};

pub use playback::{PlaybackInfo, PlaybackStatus};

pub use deezer_client::{spawn_fetch, DeezerClient, TrackRepository};

pub use app_model::AppModel;

#[cfg(test)]
pub(crate) use deezer_client::tests as fetch_fixtures;
