//! Lyric timeline parser
//!
//! Parses loosely-formatted timed text into an ordered timeline:
//! [mm:ss.xxx] tags anywhere in a line, one entry per tag, near-simultaneous
//! bilingual lines merged into a single multi-line entry.
//!
//! Example:
//! [00:10.00]你好
//! [00:10.10]Hello

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches `[m:ss]`, `[mm:ss.x]`, `[mmm:ss.xxx]` and the variants in
/// between, anywhere in a line.
static TIME_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,3}):(\d{1,2})(?:\.(\d{1,3}))?\]").unwrap());

/// Two entries closer than this are the same lyric instant (original plus
/// translation) and get merged.
const MERGE_WINDOW_SECS: f64 = 0.2;

/// A single lyric line tagged with a playback offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Offset from track start, in seconds.
    pub time: f64,
    /// Display text; bilingual pairs are newline-joined.
    pub text: String,
}

/// An ordered lyric timeline: ascending by `time`, no two entries share a
/// timestamp. Shaped so that "active line at time T" is a plain monotonic
/// search on the consumer side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricTimeline {
    pub lines: Vec<LyricLine>,
}

impl LyricTimeline {
    /// Parse a raw timed-text blob.
    ///
    /// Best-effort: lines without a timestamp tag are ignored, tags with no
    /// remaining text contribute nothing, and empty input yields an empty
    /// timeline. Never fails.
    pub fn parse(raw: &str) -> Self {
        let mut entries: Vec<LyricLine> = Vec::new();

        for line in raw.lines() {
            let text = TIME_TAG.replace_all(line, "").trim().to_string();
            if text.is_empty() {
                continue;
            }
            // A line may carry several tags: the same text repeated at
            // several times, one entry each.
            for caps in TIME_TAG.captures_iter(line) {
                entries.push(LyricLine {
                    time: tag_seconds(&caps),
                    text: text.clone(),
                });
            }
        }

        // Stable: entries sharing a timestamp keep their input order, which
        // fixes the merge direction below.
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));

        let mut lines: Vec<LyricLine> = Vec::new();
        for entry in entries {
            match lines.last_mut() {
                Some(last) if (entry.time - last.time).abs() < MERGE_WINDOW_SECS => {
                    if last.text == entry.text {
                        continue;
                    }
                    if has_chinese(&last.text) && !has_chinese(&entry.text) {
                        // Some sources emit the Chinese translation before
                        // the original; the original line goes on top.
                        last.text = format!("{}\n{}", entry.text, last.text);
                    } else {
                        last.text = format!("{}\n{}", last.text, entry.text);
                    }
                }
                _ => lines.push(entry),
            }
        }

        tracing::debug!(lines = lines.len(), "parsed lyric timeline");
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Seconds for one matched tag.
///
/// The fraction is right-padded with zeros to exactly three digits and read
/// as milliseconds: `.5` is 500ms, `.05` is 50ms, `.005` is 5ms. Seconds of
/// 60 or more are taken as literal arithmetic, not rejected.
fn tag_seconds(caps: &regex::Captures<'_>) -> f64 {
    let minutes: u32 = caps[1].parse().unwrap_or(0);
    let seconds: u32 = caps[2].parse().unwrap_or(0);
    let millis: u32 = caps
        .get(3)
        .and_then(|m| format!("{:0<3}", m.as_str()).parse().ok())
        .unwrap_or(0);
    f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(millis) / 1000.0
}

fn has_chinese(s: &str) -> bool {
    s.chars().any(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_timeline() {
        assert!(LyricTimeline::parse("").is_empty());
        assert!(LyricTimeline::parse("\n\n").is_empty());
    }

    #[test]
    fn fraction_is_padded_to_milliseconds() {
        let t = LyricTimeline::parse("[01:02.5]a\n[02:03.05]b\n[03:04.005]c");
        assert_eq!(t.len(), 3);
        assert!((t.lines[0].time - 62.5).abs() < 1e-9);
        assert!((t.lines[1].time - 123.05).abs() < 1e-9);
        assert!((t.lines[2].time - 184.005).abs() < 1e-9);
    }

    #[test]
    fn tag_without_fraction() {
        let t = LyricTimeline::parse("[01:30]line");
        assert_eq!(t.lines[0].time, 90.0);
    }

    #[test]
    fn seconds_overflow_is_literal_arithmetic() {
        let t = LyricTimeline::parse("[00:90]late");
        assert_eq!(t.lines[0].time, 90.0);
    }

    #[test]
    fn one_entry_per_tag_on_a_shared_line() {
        let t = LyricTimeline::parse("[00:10.00][01:10.00]chorus");
        assert_eq!(t.len(), 2);
        assert_eq!(t.lines[0].time, 10.0);
        assert_eq!(t.lines[1].time, 70.0);
        assert_eq!(t.lines[0].text, "chorus");
        assert_eq!(t.lines[1].text, "chorus");
    }

    #[test]
    fn untagged_lines_are_ignored() {
        let t = LyricTimeline::parse("a plain line\n[00:01.00]tagged\nanother");
        assert_eq!(t.len(), 1);
        assert_eq!(t.lines[0].text, "tagged");
    }

    #[test]
    fn blank_text_after_stripping_is_discarded() {
        let t = LyricTimeline::parse("[00:05.00]   \n[00:06.00]");
        assert!(t.is_empty());
    }

    #[test]
    fn metadata_tags_do_not_match() {
        let t = LyricTimeline::parse("[ti:Title]\n[ar:Artist]\n[00:01.00]first");
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn near_duplicate_text_is_dropped() {
        let t = LyricTimeline::parse("[00:10.00]same\n[00:10.10]same");
        assert_eq!(t.len(), 1);
        assert_eq!(t.lines[0].text, "same");
        assert_eq!(t.lines[0].time, 10.0);
    }

    #[test]
    fn bilingual_merge_puts_original_above_translation() {
        let t = LyricTimeline::parse("[00:10.00]你好\n[00:10.10]Hello");
        assert_eq!(t.len(), 1);
        assert_eq!(t.lines[0].time, 10.0);
        assert_eq!(t.lines[0].text, "Hello\n你好");
    }

    #[test]
    fn non_chinese_pairs_merge_in_arrival_order() {
        let t = LyricTimeline::parse("[00:10.00]first\n[00:10.10]second");
        assert_eq!(t.len(), 1);
        assert_eq!(t.lines[0].text, "first\nsecond");
    }

    #[test]
    fn entries_outside_the_window_stay_separate() {
        let t = LyricTimeline::parse("[00:10.00]你好\n[00:10.30]Hello");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn timeline_is_sorted_with_distinct_times() {
        let t = LyricTimeline::parse(
            "[00:30.00]third\n[00:05.00]first\n[00:30.00]third\n[00:12.00]second",
        );
        for pair in t.lines.windows(2) {
            assert!(pair[0].time < pair[1].time);
        }
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn reparsing_a_reserialized_timeline_is_stable() {
        let first = LyricTimeline::parse(
            "[00:10.00]你好\n[00:10.10]Hello\n[00:21.50]下一句\n[00:21.55]Next line",
        );

        let mut blob = String::new();
        for line in &first.lines {
            let minutes = (line.time / 60.0) as u32;
            let seconds = line.time - f64::from(minutes) * 60.0;
            for segment in line.text.split('\n') {
                blob.push_str(&format!("[{minutes:02}:{seconds:06.3}]{segment}\n"));
            }
        }

        let second = LyricTimeline::parse(&blob);
        assert_eq!(first, second);
    }
}
