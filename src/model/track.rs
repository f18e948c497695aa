//! Track records as returned by the search API

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Album {
    pub title: String,
    #[serde(rename = "cover_big", default)]
    pub cover_url: String,
}

/// A single search hit. Immutable once fetched.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: u64,
    pub title: String,
    #[serde(rename = "preview", default)]
    pub preview_url: String,
    pub album: Album,
    pub artist: Artist,
    /// Length of the full track in seconds (the preview is always shorter)
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Ordered result of the one search call; fixed for the session
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

/// Envelope of the search endpoint: `{ "data": [...] }`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Track>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_response() {
        let body = r#"{
            "data": [{
                "id": 1109731,
                "title": "Lose Yourself",
                "preview": "https://cdns-preview-a.dzcdn.net/stream/c-13039fed16a173733f227b0bec631034-12.mp3",
                "duration": 326,
                "rank": 920262,
                "artist": { "id": 13, "name": "Eminem" },
                "album": {
                    "id": 119606,
                    "title": "Curtain Call: The Hits",
                    "cover_big": "https://e-cdns-images.dzcdn.net/images/cover/500x500.jpg"
                },
                "type": "track"
            }],
            "total": 301,
            "next": "https://api.deezer.com/search?q=eminem&index=25"
        }"#;

        let response: SearchResponse = serde_json::from_str(body).expect("valid body");
        assert_eq!(response.data.len(), 1);
        let track = &response.data[0];
        assert_eq!(track.title, "Lose Yourself");
        assert_eq!(track.artist.name, "Eminem");
        assert_eq!(track.album.title, "Curtain Call: The Hits");
        assert!(track.album.cover_url.ends_with("500x500.jpg"));
        assert!(track.preview_url.ends_with(".mp3"));
        assert_eq!(track.duration, Some(326));
    }

    #[test]
    fn missing_data_means_empty_playlist() {
        let response: SearchResponse = serde_json::from_str(r#"{"total": 0}"#).expect("valid body");
        assert!(response.data.is_empty());
    }
}
