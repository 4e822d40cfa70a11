//! Subtitle selection.
//!
//! Resolves which subtitle entry a run captions, given `--sub-number` and
//! `--display-text`:
//!
//! | `--sub-number` | `--display-text` | entry | caption |
//! |---|---|---|---|
//! | given | given | `track[n]` | the literal display text |
//! | given | - | `track[n]` | `track[n].text` |
//! | - | given | first entry containing the text | the literal display text |
//! | - | - | error | - |

use crate::configuration::Configuration;
use crate::error::SelectionError;
use crate::subtitle::SubtitleTrack;
use crate::timing;

/// The subtitle entry a run will caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSubtitle {
    /// Index of the entry in its track.
    pub index: usize,
    /// Display start, in milliseconds.
    pub start_ms: i64,
    /// Display end, in milliseconds.
    pub end_ms: i64,
    /// Text to burn into the clip.
    pub text: String,
}

impl SelectedSubtitle {
    /// Window start in seconds.
    pub fn start_seconds(&self) -> f64 {
        timing::milliseconds_to_seconds(self.start_ms)
    }

    /// Window end in seconds.
    pub fn end_seconds(&self) -> f64 {
        timing::milliseconds_to_seconds(self.end_ms)
    }
}

/// Pick the entry to caption from `config.sub_number` and
/// `config.display_text`.
///
/// With `config.capital` set, the resolved caption is upper-cased. Text
/// search always uses the display text as typed.
///
/// # Errors
///
/// - [`SelectionError::NotSpecified`] if neither option is set.
/// - [`SelectionError::IndexOutOfRange`] if `sub_number` is past the end of
///   the track.
/// - [`SelectionError::TextNotFound`] if no entry contains `display_text`.
pub fn select_subtitle(
    config: &Configuration,
    track: &SubtitleTrack,
) -> Result<SelectedSubtitle, SelectionError> {
    let display_text = config.display_text.as_deref();

    let (entry, text) = match (config.sub_number, display_text) {
        (Some(index), literal) => {
            let entry = track
                .get(index)
                .ok_or(SelectionError::IndexOutOfRange {
                    index,
                    count: track.len(),
                })?;
            let text = literal.unwrap_or(entry.text.as_str()).to_string();
            (entry, text)
        }
        (None, Some(literal)) => {
            let entry = track
                .iter()
                .find(|entry| entry.text.contains(literal))
                .ok_or_else(|| SelectionError::TextNotFound {
                    text: literal.to_string(),
                })?;
            log::debug!("{literal:?} found in subtitle {}: {:?}", entry.index, entry.text);
            (entry, literal.to_string())
        }
        (None, None) => return Err(SelectionError::NotSpecified),
    };

    let text = if config.capital {
        text.to_uppercase()
    } else {
        text
    };

    Ok(SelectedSubtitle {
        index: entry.index,
        start_ms: entry.start_ms,
        end_ms: entry.end_ms,
        text,
    })
}
