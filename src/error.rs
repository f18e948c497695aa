//! Boundary error types
//!
//! Both errors are caught where they occur and turned into a log line plus a
//! transient notification; neither ever reaches `main`.

use thiserror::Error;

/// The track search could not produce a playlist
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("search request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("search API answered with HTTP {0}")]
    Status(u16),
    #[error("search response could not be parsed: {0}")]
    Body(#[source] serde_json::Error),
}

/// A preview clip could not be prepared or played
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("invalid preview URL '{0}'")]
    InvalidUrl(String),
    #[error("could not download preview: {0}")]
    Download(String),
    #[error("could not decode preview: {0}")]
    Decode(String),
    #[error("could not resample preview: {0}")]
    Resample(String),
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("could not start audio worker: {0}")]
    Worker(#[source] std::io::Error),
    /// Reported asynchronously by a clip worker
    #[error("preview playback failed: {0}")]
    Clip(String),
}
