//! Run configuration.
//!
//! [`Configuration`] is the immutable record of every option a run accepts.
//! It doubles as the `clap` command definition, so the binary and the tests
//! build it the same way through [`Configuration::from_args`].
//!
//! # Example
//!
//! ```
//! use subgif::Configuration;
//!
//! let config = Configuration::from_args(["subgif", "clip.mp4", "clip.srt", "--sub-number", "3"])?;
//! assert_eq!(config.sub_number, Some(3));
//! assert_eq!(config.font_size, 45);
//! # Ok::<(), subgif::SubgifError>(())
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::error::SubgifError;
use crate::ffmpeg::FfmpegLogLevel;

const AFTER_HELP: &str = "Examples:\n  subgif movie.mkv movie.srt --sub-number 42\n  subgif movie.mkv movie.srt --display-text \"I'll be back\" --gif back --resize 0.5 --fps 12\n  subgif movie.mkv movie.ass --sub-number 7 --font DejaVuSans --font-color yellow --capital";

/// Frame rate assumed for frame-based subtitle formats (MicroDVD).
pub const DEFAULT_SUBTITLE_FPS: f64 = 25.0;

/// Everything a single run needs, parsed once from the command line.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "subgif",
    version,
    about = "Generate GIFs with subtitles from a video and a subtitle file",
    after_help = AFTER_HELP
)]
pub struct Configuration {
    /// Video file to use for the GIF.
    pub video: PathBuf,

    /// Subtitle file to take the caption and its timing from.
    pub subtitles: PathBuf,

    /// Text to display as the caption; also used to search the subtitles
    /// when --sub-number is not given.
    #[arg(long)]
    pub display_text: Option<String>,

    /// Zero-based index of the subtitle entry to use.
    #[arg(long)]
    pub sub_number: Option<usize>,

    /// Output GIF path (default: the video path with a .gif extension).
    #[arg(long)]
    pub gif: Option<String>,

    /// Scale factor for the output, 1.0 being the source size.
    #[arg(long, default_value_t = 1.0, value_parser = parse_resize)]
    pub resize: f64,

    /// Frame rate to export the GIF with (default: the video's frame rate).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Caption font: a family name looked up in the system font
    /// directories, or a path to a font file.
    #[arg(long, default_value = "arial")]
    pub font: String,

    /// Caption font size in pixels.
    #[arg(long, default_value_t = 45, value_parser = clap::value_parser!(u32).range(1..))]
    pub font_size: u32,

    /// Caption fill color (name or #rrggbb).
    #[arg(long, default_value = "white")]
    pub font_color: String,

    /// Caption outline width in pixels (0 disables the outline).
    #[arg(long, default_value_t = 1)]
    pub stroke_width: u32,

    /// Caption outline color (name or #rrggbb).
    #[arg(long, default_value = "black")]
    pub stroke_color: String,

    /// Capitalize every letter of the caption.
    #[arg(long)]
    pub capital: bool,

    /// Frame rate used to time frame-based subtitle formats such as MicroDVD.
    #[arg(long, default_value_t = DEFAULT_SUBTITLE_FPS, value_parser = parse_subtitle_fps)]
    pub subtitle_fps: f64,

    /// Number of times the GIF repeats (default: loop forever).
    #[arg(long)]
    pub repeat: Option<u16>,

    /// Replace the output file if it already exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Show a progress bar while encoding.
    #[arg(long)]
    pub progress: bool,

    /// Show additional logging output.
    #[arg(long)]
    pub verbose: bool,

    /// Print a machine-readable summary of the run.
    #[arg(long)]
    pub json: bool,

    /// FFmpeg's own console log level (default: error, or warning with
    /// --verbose).
    #[arg(long, value_enum)]
    pub log_level: Option<FfmpegLogLevel>,
}

impl Configuration {
    /// Parse a configuration from an argument list (program name first).
    ///
    /// # Errors
    ///
    /// Returns [`SubgifError::Usage`] for missing positionals, unknown
    /// flags, values that fail conversion, and help/version requests.
    pub fn from_args<I, T>(args: I) -> Result<Self, SubgifError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::try_parse_from(args)?)
    }
}

fn parse_resize(value: &str) -> Result<f64, String> {
    let factor: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !factor.is_finite() || factor <= 0.0 {
        return Err(format!("resize factor must be greater than 0, got {value}"));
    }
    Ok(factor)
}

fn parse_subtitle_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if !fps.is_finite() || fps <= 0.0 {
        return Err(format!("subtitle fps must be greater than 0, got {value}"));
    }
    Ok(fps)
}
