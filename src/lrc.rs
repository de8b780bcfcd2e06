//! Timed lyrics in the LRC format.
//!
//! Each line carries one or more `[mm:ss.xx]` tags followed by its text:
//!
//! ```text
//! [00:12.00][01:40.50]Some chorus line
//! [00:17.20]The next line
//! ```
//!
//! Untagged lines (metadata such as `[ar:...]`) are ignored.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

static TIMED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:\[\d{2,}:\d{2,}\.\d{2,}\])+)(.*)").expect("valid timed line pattern")
});

static TIME_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{2,}):(\d{2,})\.(\d{2,})\]").expect("valid time tag pattern")
});

/// Blank lines shorter than this are gaps between verses, not pauses.
const MIN_BLANK_GAP: Duration = Duration::from_secs(3);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LrcError {
    #[error("no timed lines found")]
    NoTimedLines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsLine {
    pub time_tag: Duration,
    pub text: String,
}

/// Lyrics sorted by time tag.
#[derive(Debug, Clone)]
pub struct Lyrics {
    lines: Vec<LyricsLine>,
    last_index: usize,
}

impl Lyrics {
    pub fn parse(source: &str) -> Result<Self, LrcError> {
        let mut lines: Vec<LyricsLine> = source.lines().flat_map(parse_line).collect();
        if lines.is_empty() {
            return Err(LrcError::NoTimedLines);
        }
        // Stable, so lines sharing a tag keep file order.
        lines.sort_by_key(|line| line.time_tag);

        let next_tags: Vec<Option<Duration>> = lines
            .iter()
            .skip(1)
            .map(|line| Some(line.time_tag))
            .chain(std::iter::once(None))
            .collect();
        let lines = lines
            .into_iter()
            .zip(next_tags)
            .filter(|(line, next)| match next {
                Some(next) if line.text.is_empty() => *next - line.time_tag > MIN_BLANK_GAP,
                _ => true,
            })
            .map(|(line, _)| line)
            .collect::<Vec<_>>();

        log::debug!("parsed {} timed lyrics lines", lines.len());
        Ok(Self {
            lines,
            last_index: 0,
        })
    }

    pub fn lines(&self) -> &[LyricsLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Time tag of the final line.
    pub fn last_time_tag(&self) -> Duration {
        self.lines.last().map_or(Duration::ZERO, |line| line.time_tag)
    }

    /// The line being sung at `position`: the last one tagged at or before it.
    ///
    /// Playback usually moves forward a little at a time, so the previous
    /// answer and its successor are checked before searching.
    pub fn line_at(&mut self, position: Duration) -> Option<&LyricsLine> {
        if let Some(current) = self.lines.get(self.last_index) {
            let before_next = self
                .lines
                .get(self.last_index + 1)
                .map_or(true, |next| position < next.time_tag);
            if current.time_tag <= position && before_next {
                return self.lines.get(self.last_index);
            }
        }

        let index = self.lines.partition_point(|line| line.time_tag <= position);
        if index == 0 {
            self.last_index = 0;
            return None;
        }
        self.last_index = index - 1;
        self.lines.get(self.last_index)
    }
}

fn parse_line(line: &str) -> Vec<LyricsLine> {
    let Some(captures) = TIMED_LINE.captures(line) else {
        return Vec::new();
    };
    let tags = captures.get(1).map_or("", |m| m.as_str());
    let raw_text = captures.get(2).map_or("", |m| m.as_str());
    let text = html_escape::decode_html_entities(raw_text).trim().to_string();

    TIME_TAG
        .captures_iter(tags)
        .filter_map(|tag| parse_time_tag(&tag[1], &tag[2], &tag[3]))
        .map(|time_tag| LyricsLine {
            time_tag,
            text: text.clone(),
        })
        .collect()
}

/// Only the first two fractional digits count, as hundredths.
fn parse_time_tag(minutes: &str, seconds: &str, fraction: &str) -> Option<Duration> {
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    let hundredths: u64 = fraction.get(..2)?.parse().ok()?;
    let whole = minutes.checked_mul(60)?.checked_add(seconds)?;
    Duration::from_secs(whole).checked_add(Duration::from_millis(hundredths * 10))
}
