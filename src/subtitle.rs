//! Subtitle track loading.
//!
//! This module provides [`SubtitleTrack`], an ordered, read-only list of
//! [`SubtitleEntry`] values loaded from a subtitle file. Parsing is delegated
//! to [`subparse`], which understands SubRip (`.srt`), SubStation Alpha
//! (`.ssa`/`.ass`) and MicroDVD (`.sub`).
//!
//! # Example
//!
//! ```no_run
//! use subgif::{SubgifError, SubtitleTrack};
//!
//! let track = SubtitleTrack::load("movie.srt", 25.0)?;
//! for entry in track.iter() {
//!     println!("#{} [{} → {} ms] {}", entry.index, entry.start_ms, entry.end_ms, entry.text);
//! }
//! # Ok::<(), SubgifError>(())
//! ```

use std::path::Path;

use subparse::{SubtitleFileInterface, SubtitleFormat};

use crate::error::SubgifError;
use crate::timing;

/// A single timed line of subtitle text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    /// Zero-based position of this entry in the file.
    pub index: usize,
    /// Display start, in milliseconds.
    pub start_ms: i64,
    /// Display end, in milliseconds.
    pub end_ms: i64,
    /// Text payload with formatting tags removed. Empty for image-based
    /// entries.
    pub text: String,
}

impl SubtitleEntry {
    /// Create an entry. `index` is the entry's position in its track.
    pub fn new(index: usize, start_ms: i64, end_ms: i64, text: impl Into<String>) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Display start in seconds.
    pub fn start_seconds(&self) -> f64 {
        timing::milliseconds_to_seconds(self.start_ms)
    }

    /// Display end in seconds.
    pub fn end_seconds(&self) -> f64 {
        timing::milliseconds_to_seconds(self.end_ms)
    }
}

/// Ordered subtitle entries, in the order they appear in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    /// Build a track from `(start_ms, end_ms, text)` triples, assigning
    /// indices in order.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i64, i64, S)>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(index, (start_ms, end_ms, text))| {
                SubtitleEntry::new(index, start_ms, end_ms, text)
            })
            .collect();
        Self { entries }
    }

    /// Load and parse a subtitle file.
    ///
    /// The format is detected from the extension and the file content.
    /// `fps` is only consulted by frame-based formats (MicroDVD).
    ///
    /// # Errors
    ///
    /// Returns [`SubgifError::SubtitleLoad`] if the file is missing,
    /// unreadable, or not a recognised subtitle format.
    pub fn load<P: AsRef<Path>>(path: P, fps: f64) -> Result<Self, SubgifError> {
        let path = path.as_ref();
        let load_error = |reason: String| SubgifError::SubtitleLoad {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|error| load_error(error.to_string()))?;
        let format = subparse::get_subtitle_format(path.extension(), &bytes)
            .ok_or_else(|| load_error("unrecognised subtitle format".to_string()))?;
        log::debug!("Parsing {} as {format:?}", path.display());

        let content = String::from_utf8_lossy(&bytes);
        let content = content.trim_start_matches('\u{feff}');

        let file = subparse::parse_str(format, content, fps)
            .map_err(|error| load_error(format!("parse error: {error}")))?;
        let raw_entries = file
            .get_subtitle_entries()
            .map_err(|error| load_error(format!("could not read entries: {error}")))?;

        let entries: Vec<SubtitleEntry> = raw_entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let text = entry
                    .line
                    .as_deref()
                    .map(|line| clean_subtitle_text(line, format))
                    .unwrap_or_default();
                SubtitleEntry::new(
                    index,
                    entry.timespan.start.msecs(),
                    entry.timespan.end.msecs(),
                    text,
                )
            })
            .collect();

        log::info!(
            "Loaded {} subtitle entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the track has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&SubtitleEntry> {
        self.entries.get(index)
    }

    /// Iterate over entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &SubtitleEntry> {
        self.entries.iter()
    }
}

/// Normalize a subtitle line for display.
///
/// Every format gets `\r\n` turned into `\n` and each line trimmed. For
/// SubStation Alpha, `{...}` override blocks are removed, `\N` and `\n`
/// become line breaks and `\h` a space. Other formats keep braces and
/// backslashes as literal text.
pub fn clean_subtitle_text(input: &str, format: SubtitleFormat) -> String {
    let text = if matches!(format, SubtitleFormat::SubStationAlpha) {
        strip_override_blocks(input)
            .replace("\\N", "\n")
            .replace("\\n", "\n")
            .replace("\\h", " ")
    } else {
        input.to_string()
    };

    text.replace("\r\n", "\n")
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn strip_override_blocks(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '{' if !in_tag => in_tag = true,
            '}' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}
