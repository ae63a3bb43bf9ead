//! Core of a bilingual synchronized-lyrics audio player.
//!
//! Two pieces carry the logic: [`lyrics`] turns a raw timed-text blob into
//! an ordered, bilingual-merged timeline, and [`player`] owns the playlist,
//! play mode and transport state of one playback session. Collaborators
//! feed track lists and lyric text in and observe the session's reactive
//! surface; audio output, networking and rendering live elsewhere.

pub mod config;
pub mod lyrics;
pub mod model;
pub mod player;

pub use lyrics::{LyricLine, LyricTimeline};
pub use model::Track;
pub use player::{PlayMode, PlaybackSession};
