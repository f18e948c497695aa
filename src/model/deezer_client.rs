//! Search API client producing the session playlist

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue};
use tokio::sync::oneshot;

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::{log_api_request, log_api_result};

use super::track::{Playlist, SearchResponse};

/// Anything that can turn a query into a playlist
pub trait TrackRepository: Send + Sync + 'static {
    fn fetch(&self, query: &str) -> impl Future<Output = Result<Playlist, FetchError>> + Send;
}

/// Deezer search endpoint client (direct or through RapidAPI)
#[derive(Clone)]
pub struct DeezerClient {
    http: reqwest::Client,
    endpoint: String,
}

impl DeezerClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Some(credentials) = &config.credentials {
            // Invalid header bytes would only make every request fail; skip them instead
            match (
                HeaderValue::from_str(&credentials.key),
                HeaderValue::from_str(&credentials.host),
            ) {
                (Ok(key), Ok(host)) => {
                    headers.insert("X-RapidAPI-Key", key);
                    headers.insert("X-RapidAPI-Host", host);
                }
                _ => tracing::warn!("Ignoring RapidAPI credentials with invalid characters"),
            }
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    async fn search(&self, query: &str) -> Result<Playlist, FetchError> {
        log_api_request!("search", query);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        let parsed: SearchResponse = serde_json::from_slice(&body).map_err(FetchError::Body)?;

        Ok(Playlist::new(parsed.data))
    }
}

impl TrackRepository for DeezerClient {
    async fn fetch(&self, query: &str) -> Result<Playlist, FetchError> {
        let result = self.search(query).await;
        log_api_result!("search", result);
        if let Ok(playlist) = &result {
            tracing::info!(query, tracks = playlist.len(), "Search returned tracks");
        }
        result
    }
}

/// Run a single fetch in the background and hand the result over exactly once
pub fn spawn_fetch<R: TrackRepository>(
    repository: R,
    query: String,
) -> oneshot::Receiver<Result<Playlist, FetchError>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = repository.fetch(&query).await;
        if tx.send(result).is_err() {
            tracing::debug!("Playlist receiver dropped before the fetch completed");
        }
    });
    rx
}
