//! Playback session state machine
//!
//! Owns the active playlist, the current index, the play mode and the
//! transport scalars for one logical player instance. Every operation runs
//! synchronously to completion and updates playlist and index together, so
//! a reader only ever observes a consistent pair. A multithreaded host
//! wraps the whole session in a single mutex; nothing inside needs one.

use crate::model::Track;
use rand::Rng;

/// Initial volume for a fresh session, also the config default.
pub const DEFAULT_VOLUME: f32 = 0.4;

/// Resamples allowed before shuffle falls back to a deterministic step.
const SHUFFLE_RETRY_BUDGET: usize = 8;

/// Navigation policy governing what `next` means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Sequence,
    Loop,
    Shuffle,
}

impl PlayMode {
    pub fn next(self) -> Self {
        match self {
            PlayMode::Sequence => PlayMode::Loop,
            PlayMode::Loop => PlayMode::Shuffle,
            PlayMode::Shuffle => PlayMode::Sequence,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayMode::Sequence => "sequence",
            PlayMode::Loop => "loop",
            PlayMode::Shuffle => "shuffle",
        }
    }
}

/// Reactive playback state for one player instance.
///
/// Navigation never errors: index arithmetic wraps, and operations on an
/// empty playlist are no-ops. The playlist falls back to the built-in
/// background track instead of ever leaving a dangling index.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    tracks: Vec<Track>,
    current_index: usize,
    mode: PlayMode,
    is_playing: bool,
    current_time: f64,
    duration: f64,
    is_seeking: bool,
    volume: f32,
    default_track: Track,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSession {
    /// A fresh session: empty playlist, paused, built-in fallback track.
    pub fn new() -> Self {
        Self::with_default_track(Track::default_bgm())
    }

    /// A fresh session whose fallback track comes from configuration.
    pub fn with_default_track(default_track: Track) -> Self {
        Self {
            tracks: Vec::new(),
            current_index: 0,
            mode: PlayMode::default(),
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            is_seeking: false,
            volume: DEFAULT_VOLUME,
            default_track,
        }
    }

    /// Play the given track.
    ///
    /// Requesting the track that is already active toggles pause instead of
    /// reloading the same audio; the playhead is left alone. A track whose
    /// id is already in the playlist jumps the index there, keeping the
    /// playlist and its order; an unknown track replaces the whole playlist.
    pub fn play_track(&mut self, track: Track) {
        let same_url = self
            .current_track()
            .is_some_and(|current| current.url == track.url);
        if same_url {
            self.toggle_play();
            return;
        }

        if let Some(pos) = self.tracks.iter().position(|t| t.id == track.id) {
            self.current_index = pos;
        } else {
            self.tracks = vec![track];
            self.current_index = 0;
        }
        self.current_time = 0.0;
        self.is_playing = true;
    }

    /// Replace the playlist and start playing at `start_index`.
    ///
    /// An out-of-range index clamps to the last track; an empty list falls
    /// back to the built-in track.
    pub fn play_list(&mut self, tracks: Vec<Track>, start_index: usize) {
        if tracks.is_empty() {
            tracing::warn!("play_list with no tracks, falling back to default track");
            self.tracks = vec![self.default_track.clone()];
            self.current_index = 0;
        } else {
            let last = tracks.len() - 1;
            if start_index > last {
                tracing::warn!(start_index, len = tracks.len(), "start index out of range");
            }
            self.current_index = start_index.min(last);
            self.tracks = tracks;
        }
        self.current_time = 0.0;
        self.is_playing = true;
    }

    /// Advance according to the play mode.
    ///
    /// Loop restarts the current track, shuffle picks a different random
    /// track, sequence steps forward and wraps at the end. No-op on an
    /// empty playlist.
    pub fn next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        match self.mode {
            PlayMode::Loop => {}
            PlayMode::Shuffle => {
                self.current_index = self.pick_shuffle_index();
            }
            PlayMode::Sequence => {
                self.current_index = (self.current_index + 1) % self.tracks.len();
            }
        }
        self.current_time = 0.0;
        self.is_playing = true;
    }

    fn pick_shuffle_index(&self) -> usize {
        let len = self.tracks.len();
        if len <= 1 {
            return 0;
        }
        let mut rng = rand::rng();
        for _ in 0..SHUFFLE_RETRY_BUDGET {
            let candidate = rng.random_range(0..len);
            if candidate != self.current_index {
                return candidate;
            }
        }
        // Out of resamples; step forward deterministically.
        (self.current_index + 1) % len
    }

    /// Step back one track, wrapping at the start.
    ///
    /// The play mode is not consulted here; going back is always a plain
    /// decrement. No-op on an empty playlist.
    pub fn prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.current_index = if self.current_index == 0 {
            self.tracks.len() - 1
        } else {
            self.current_index - 1
        };
        self.current_time = 0.0;
        self.is_playing = true;
    }

    pub fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
    }

    /// Move the playhead. No clamping: callers own the `[0, duration]`
    /// contract. Does not pause or resume.
    pub fn seek(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Advance the mode through sequence, loop, shuffle and around again.
    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    /// Return the session to the known-good baseline: the built-in track,
    /// paused at zero.
    pub fn reset(&mut self) {
        self.tracks = vec![self.default_track.clone()];
        self.current_index = 0;
        self.is_playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    /// Make sure something is loaded, and start it.
    ///
    /// Repopulates an empty playlist with the built-in track; a non-empty
    /// playlist is left untouched. Idempotent.
    pub fn ensure_default_track(&mut self) {
        if self.tracks.is_empty() {
            self.tracks = vec![self.default_track.clone()];
            self.current_index = 0;
        }
        self.is_playing = true;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current_index)
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_seeking(&self) -> bool {
        self.is_seeking
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Host callback: the audio element reported the track duration.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration;
    }

    /// Host callback: a scrub gesture started or ended.
    pub fn set_seeking(&mut self, seeking: bool) {
        self.is_seeking = seeking;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}
