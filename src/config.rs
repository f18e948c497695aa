//! Runtime configuration
//!
//! Everything has a compiled-in default; the environment can override the
//! search endpoint, the query term and the optional RapidAPI credentials.

use std::env;

pub const DEFAULT_ENDPOINT: &str = "https://api.deezer.com/search";
pub const DEFAULT_QUERY: &str = "eminem";
pub const DEFAULT_RAPIDAPI_HOST: &str = "deezerdevs-deezer.p.rapidapi.com";

const ENV_ENDPOINT: &str = "DEEZER_RS_ENDPOINT";
const ENV_QUERY: &str = "DEEZER_RS_QUERY";
const ENV_RAPIDAPI_KEY: &str = "RAPIDAPI_KEY";
const ENV_RAPIDAPI_HOST: &str = "RAPIDAPI_HOST";

/// Credentials for the RapidAPI proxy of the search API
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCredentials {
    pub key: String,
    pub host: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub endpoint: String,
    pub query: String,
    pub credentials: Option<ApiCredentials>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            query: DEFAULT_QUERY.to_string(),
            credentials: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        let credentials = read(ENV_RAPIDAPI_KEY).map(|key| ApiCredentials {
            key,
            host: read(ENV_RAPIDAPI_HOST).unwrap_or_else(|| DEFAULT_RAPIDAPI_HOST.to_string()),
        });

        Self {
            endpoint: read(ENV_ENDPOINT).unwrap_or(defaults.endpoint),
            query: read(ENV_QUERY).unwrap_or(defaults.query),
            credentials,
        }
    }
}
