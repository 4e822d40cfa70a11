//! # subgif
//!
//! Turn one subtitle line into a captioned animated GIF.
//!
//! `subgif` finds a subtitle entry (by index or by the text it contains),
//! cuts the matching time span out of the video, burns the caption into
//! every frame, and writes the clip as a GIF. Decoding and scaling go
//! through FFmpeg via [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next),
//! subtitles are parsed by [`subparse`], glyphs are rasterized by
//! [`fontdue`], and the GIF is encoded by the [`gif`](https://crates.io/crates/gif)
//! crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! use subgif::{Configuration, NoOpProgress};
//!
//! let config = Configuration::from_args([
//!     "subgif", "movie.mkv", "movie.srt", "--display-text", "I'll be back", "--resize", "0.5",
//! ])?;
//! let summary = subgif::convert(&config, &NoOpProgress)?;
//! println!("wrote {}", summary.output.display());
//! # Ok::<(), subgif::SubgifError>(())
//! ```
//!
//! The stages are usable on their own:
//!
//! ```no_run
//! use subgif::{Configuration, SubtitleTrack};
//!
//! let config = Configuration::from_args(["subgif", "movie.mkv", "movie.srt", "--sub-number", "12"])?;
//! let track = SubtitleTrack::load(&config.subtitles, config.subtitle_fps)?;
//! let selection = subgif::select_subtitle(&config, &track)?;
//! let output = subgif::resolve_output_path(&config);
//! subgif::render(&config, &selection, &output)?;
//! # Ok::<(), subgif::SubgifError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod color;
pub mod configuration;
pub mod converter;
pub mod error;
pub mod ffmpeg;
pub mod font;
pub mod gif;
pub mod metadata;
pub mod output;
pub mod overlay;
pub mod progress;
pub mod render;
pub mod selection;
pub mod subtitle;
pub mod timing;
pub mod video;

pub use color::parse_color;
pub use configuration::Configuration;
pub use converter::convert;
pub use error::{RenderError, SelectionError, SubgifError};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use crate::gif::GifWriter;
pub use metadata::VideoMetadata;
pub use output::resolve_output_path;
pub use overlay::CaptionStyle;
pub use progress::{NoOpProgress, ProgressCallback, ProgressInfo};
pub use render::{CaptionedGifEncoder, MIN_FRAME_DELAY, RenderSummary, render, render_with_progress};
pub use selection::{SelectedSubtitle, select_subtitle};
pub use subtitle::{SubtitleEntry, SubtitleTrack};
pub use timing::FrameSchedule;
pub use video::VideoClip;
