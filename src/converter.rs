//! The end-to-end run: subtitles in, GIF out.

use crate::configuration::Configuration;
use crate::error::SubgifError;
use crate::output::resolve_output_path;
use crate::progress::ProgressCallback;
use crate::render::{RenderSummary, render_with_progress};
use crate::selection::select_subtitle;
use crate::subtitle::SubtitleTrack;

/// Load the subtitle track, select the entry, and render it to the
/// resolved output path.
///
/// # Errors
///
/// Returns the first failure, tagged by stage:
/// [`SubgifError::SubtitleLoad`], [`SubgifError::Selection`] or
/// [`SubgifError::Render`].
pub fn convert(
    config: &Configuration,
    progress: &dyn ProgressCallback,
) -> Result<RenderSummary, SubgifError> {
    let track = SubtitleTrack::load(&config.subtitles, config.subtitle_fps)?;
    let selection = select_subtitle(config, &track)?;
    log::info!(
        "Selected subtitle {} ({} ms → {} ms): {:?}",
        selection.index,
        selection.start_ms,
        selection.end_ms,
        selection.text
    );

    let output = resolve_output_path(config);
    Ok(render_with_progress(config, &selection, &output, progress)?)
}
