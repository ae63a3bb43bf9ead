use serde::{Deserialize, Serialize};

/// A playable track descriptor.
///
/// Produced by content-listing collaborators (upload, wiki) and shared into
/// playlists by value; the playback session never mutates one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Opaque identifier, unique within a playlist snapshot.
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    /// Playback source.
    pub url: String,
    pub cover: Option<String>,
    pub mime_type: Option<String>,
    /// Raw timed-text blob, parsed lazily by the consumer.
    pub lyrics: Option<String>,
}

impl Track {
    /// Built-in background track, used whenever a session needs a
    /// known-good playlist (empty-playlist fallback, `reset`).
    pub fn default_bgm() -> Self {
        Self {
            id: "default-bgm".to_string(),
            title: "Storyteller".to_string(),
            artist: None,
            url: "/audio/storyteller.mp3".to_string(),
            cover: None,
            mime_type: None,
            lyrics: None,
        }
    }
}
