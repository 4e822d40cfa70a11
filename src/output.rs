//! Output path resolution.

use std::path::{Path, PathBuf};

use crate::configuration::Configuration;

/// Extension of the produced file, without the dot.
pub const OUTPUT_EXTENSION: &str = "gif";

/// Decide where the GIF is written.
///
/// An explicit `--gif` name is used as given, with `.gif` appended when the
/// name does not already contain it (compared case-insensitively).
/// Otherwise the video path's extension is replaced with `.gif`.
pub fn resolve_output_path(config: &Configuration) -> PathBuf {
    match &config.gif {
        Some(name) => with_gif_suffix(name),
        None => from_video_path(&config.video),
    }
}

fn with_gif_suffix(name: &str) -> PathBuf {
    let suffix = format!(".{OUTPUT_EXTENSION}");
    if name.to_lowercase().contains(&suffix) {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}{suffix}"))
    }
}

fn from_video_path(video: &Path) -> PathBuf {
    video.with_extension(OUTPUT_EXTENSION)
}
