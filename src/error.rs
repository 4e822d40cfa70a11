//! Error types for the `subgif` crate.
//!
//! [`SubgifError`] is the top-level error returned by the converter. It has
//! one variant per stage of a run (argument parsing, subtitle loading,
//! subtitle selection, rendering) so the binary can map each stage to an
//! exit code. Render failures carry a [`RenderError`] with the underlying
//! cause from FFmpeg, the font rasterizer, or the GIF encoder.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for subtitle-load and render failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for usage errors and unsatisfiable subtitle selections.
pub const EXIT_USAGE: i32 = 2;

/// The unified error type for a `subgif` run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubgifError {
    /// Command-line arguments were missing or could not be converted.
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// The subtitle file could not be read or parsed.
    #[error("Failed to load subtitles from {path}: {reason}")]
    SubtitleLoad {
        /// Path passed as the `subtitles` argument.
        path: PathBuf,
        /// Underlying reason the load failed.
        reason: String,
    },

    /// No usable subtitle entry could be resolved.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Decoding, overlay rendering, or GIF encoding failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl SubgifError {
    /// The process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            SubgifError::Usage(error) => error.exit_code(),
            SubgifError::Selection(_) => EXIT_USAGE,
            SubgifError::SubtitleLoad { .. } | SubgifError::Render(_) => EXIT_FAILURE,
        }
    }
}

/// Why a subtitle entry could not be selected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SelectionError {
    /// Neither `--display-text` nor `--sub-number` was given.
    #[error("No subtitle specified")]
    NotSpecified,

    /// `--display-text` did not occur in any subtitle entry.
    #[error("Display text {text:?} not found in subtitle file")]
    TextNotFound {
        /// The text that was searched for.
        text: String,
    },

    /// `--sub-number` points past the end of the track.
    #[error("Subtitle {index} is out of range (track has {count} entries)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of entries in the track.
        count: usize,
    },
}

impl SelectionError {
    /// The flags a user can pass to make the selection succeed.
    pub fn hint(&self) -> &'static str {
        match self {
            SelectionError::NotSpecified => {
                "Use:\n\t--display-text=SUBTITLE or\n\t--sub-number=SUBTITLE_NUMBER"
            }
            SelectionError::TextNotFound { .. } | SelectionError::IndexOutOfRange { .. } => {
                "Check if these were correct:\n\t--display-text=SUBTITLE or\n\t--sub-number=SUBTITLE_NUMBER"
            }
        }
    }
}

/// Failures in the decode, overlay, and encode pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The video file could not be opened.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed as the `video` argument.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The subtitle window is empty or inverted.
    #[error("Invalid time window: start ({start:.3}s) must be less than end ({end:.3}s)")]
    InvalidWindow {
        /// Window start in seconds.
        start: f64,
        /// Window end in seconds.
        end: f64,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// `--fps` was not given and the video does not report a frame rate.
    #[error("Source frame rate is unknown; pass --fps")]
    UnknownFrameRate,

    /// The window contained no decodable frames.
    #[error("No frames decoded between {start:.3}s and {end:.3}s")]
    NoFrames {
        /// Window start in seconds.
        start: f64,
        /// Window end in seconds.
        end: f64,
    },

    /// The requested font could not be located or parsed.
    #[error("Font error: {0}")]
    FontError(String),

    /// A colour string was not recognised.
    #[error("Unsupported color: {0:?}")]
    UnsupportedColor(String),

    /// GIF encoding failed.
    #[error("GIF encoding error: {0}")]
    GifEncodeError(String),

    /// The output file exists and overwriting was not requested.
    #[error("Output already exists: {} (use --overwrite to replace)", .0.display())]
    OutputExists(PathBuf),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for RenderError {
    fn from(error: FfmpegError) -> Self {
        RenderError::FfmpegError(error.to_string())
    }
}
