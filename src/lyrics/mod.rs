//! Lyric timeline support
//!
//! A raw timed-text blob goes in, an ordered bilingual-merged timeline
//! comes out. Parsing is pure and best-effort: anything unrecognizable is
//! skipped rather than reported, so partially garbled sources still render
//! whatever lines are recoverable.

pub mod parser;

pub use parser::{LyricLine, LyricTimeline};
