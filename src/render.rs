//! Sub-clip rendering.
//!
//! Decodes the selected subtitle's window from the video, draws the caption
//! on every frame, and streams the result into a GIF.
//!
//! The GIF frame rate is either `--fps` or the source frame rate. Output
//! ticks fall at `start + k / fps`; each tick shows the latest decoded
//! frame, and consecutive ticks on the same frame become one GIF frame with
//! a longer delay. Above 50 fps some ticks round to under two centiseconds;
//! those frames are merged with their successors instead of being written
//! with a delay that players would slow down.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbaImage;
use serde::Serialize;

use crate::configuration::Configuration;
use crate::error::RenderError;
use crate::font::load_font;
use crate::gif::GifWriter;
use crate::metadata::VideoMetadata;
use crate::overlay::{self, CaptionStyle};
use crate::progress::{NoOpProgress, ProgressCallback, ProgressInfo};
use crate::selection::SelectedSubtitle;
use crate::timing::FrameSchedule;
use crate::video::{VideoClip, scaled_dimensions};

/// What a finished render produced.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSummary {
    /// Where the GIF was written.
    pub output: PathBuf,
    /// Index of the captioned subtitle entry.
    pub subtitle_index: usize,
    /// Caption text as drawn.
    pub text: String,
    /// Window start in seconds.
    pub start_seconds: f64,
    /// Window end in seconds.
    pub end_seconds: f64,
    /// Output frame rate the window was sampled at.
    pub frames_per_second: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Source frames decoded inside the window.
    pub source_frames: u64,
    /// Frames stored in the GIF after merging repeated ticks.
    pub gif_frames: u64,
    /// Source video stream.
    pub source: VideoMetadata,
}

/// Render `selection` from `config.video` into a GIF at `output`.
///
/// # Errors
///
/// See [`render_with_progress`].
pub fn render(
    config: &Configuration,
    selection: &SelectedSubtitle,
    output: &Path,
) -> Result<RenderSummary, RenderError> {
    render_with_progress(config, selection, output, &NoOpProgress)
}

/// Render with a progress callback invoked after every decoded source frame.
///
/// # Errors
///
/// - [`RenderError::InvalidWindow`] if the subtitle ends before it starts.
/// - [`RenderError::OutputExists`] if `output` exists and
///   `config.overwrite` is not set.
/// - [`RenderError::UnsupportedColor`] / [`RenderError::FontError`] if the
///   caption style cannot be built.
/// - [`RenderError::FileOpen`], [`RenderError::NoVideoStream`], or a decode
///   error from the video.
/// - [`RenderError::UnknownFrameRate`] if `--fps` is absent and the source
///   does not report a frame rate.
/// - [`RenderError::NoFrames`] if the window holds no frames.
/// - [`RenderError::GifEncodeError`] if the GIF cannot be written.
pub fn render_with_progress(
    config: &Configuration,
    selection: &SelectedSubtitle,
    output: &Path,
    progress: &dyn ProgressCallback,
) -> Result<RenderSummary, RenderError> {
    let start = selection.start_seconds();
    let end = selection.end_seconds();
    if !(start < end) {
        return Err(RenderError::InvalidWindow { start, end });
    }
    check_output(output, config.overwrite)?;

    let style = CaptionStyle::from_configuration(config)?;
    let font = load_font(&config.font, style.font_size)?;
    let caption = overlay::render_caption(&font, &selection.text, &style);
    log::debug!(
        "Caption {:?} rendered at {}x{}",
        selection.text,
        caption.width(),
        caption.height()
    );

    let mut clip = VideoClip::open(&config.video)?;
    let source = clip.metadata().clone();
    let frames_per_second = match config.fps {
        Some(fps) => f64::from(fps),
        None if source.frames_per_second > 0.0 => source.frames_per_second,
        None => {
            return Err(RenderError::UnknownFrameRate);
        }
    };
    let (width, height) = scaled_dimensions(source.width, source.height, config.resize);
    log::info!(
        "Rendering subtitle {} ({start:.3}s..{end:.3}s) at {width}x{height}, {frames_per_second:.3} fps to {}",
        selection.index,
        output.display()
    );

    let duration = source.duration.as_secs_f64();
    if duration > 0.0 && start >= duration {
        return Err(RenderError::NoFrames { start, end });
    }

    let started = Instant::now();
    let window = EncodeWindow {
        start,
        end,
        frames_per_second,
        width,
        height,
    };
    let (source_frames, gif_frames) =
        match encode_window(&mut clip, config, caption, output, &window, started, progress) {
            Ok(counts) => counts,
            Err(error) => {
                if let Err(remove_error) = std::fs::remove_file(output) {
                    log::debug!("Could not remove {}: {remove_error}", output.display());
                }
                return Err(error);
            }
        };
    log::info!(
        "Wrote {gif_frames} GIF frames from {source_frames} source frames in {:.2?}",
        started.elapsed()
    );

    Ok(RenderSummary {
        output: output.to_path_buf(),
        subtitle_index: selection.index,
        text: selection.text.clone(),
        start_seconds: start,
        end_seconds: end,
        frames_per_second,
        width,
        height,
        source_frames,
        gif_frames,
        source,
    })
}

struct EncodeWindow {
    start: f64,
    end: f64,
    frames_per_second: f64,
    width: u32,
    height: u32,
}

/// Stream the window into a new GIF at `output`. Returns the number of
/// source frames decoded and GIF frames written.
fn encode_window(
    clip: &mut VideoClip,
    config: &Configuration,
    caption: RgbaImage,
    output: &Path,
    window: &EncodeWindow,
    started: Instant,
    progress: &dyn ProgressCallback,
) -> Result<(u64, u64), RenderError> {
    let writer = GifWriter::create(output, window.width, window.height, config.repeat)?;
    let mut encoder = CaptionedGifEncoder::new(
        writer,
        caption,
        FrameSchedule::new(window.start, window.end, window.frames_per_second),
    );

    clip.decode_window(window.start, window.end, config.resize, |timestamp, frame| {
        encoder.push(timestamp, frame)?;
        progress.on_progress(&encoder.progress_info(started, Some(timestamp)));
        Ok(())
    })?;

    let source_frames = encoder.source_frames();
    let total_ticks = encoder.total_ticks();
    let (_, gif_frames) = encoder.finish()?;
    progress.on_finish(&ProgressInfo {
        current: total_ticks,
        total: Some(total_ticks),
        elapsed: started.elapsed(),
        current_timestamp: None,
    });
    Ok((source_frames, gif_frames))
}

fn check_output(output: &Path, overwrite: bool) -> Result<(), RenderError> {
    if output.exists() {
        if !overwrite {
            return Err(RenderError::OutputExists(output.to_path_buf()));
        }
        log::warn!("Overwriting {}", output.display());
    }
    Ok(())
}

/// Shortest GIF delay, in centiseconds, that players honour. Browsers show
/// anything below it at 10.
pub const MIN_FRAME_DELAY: u16 = 2;

/// A decoded frame waiting to learn how many ticks it stays on screen.
struct PendingFrame {
    image: RgbaImage,
    ticks: u64,
}

/// A frame whose ticks are known, held back until the next one arrives.
struct ReadyFrame {
    image: RgbaImage,
    first_tick: u64,
    ticks: u64,
}

/// Turns timestamped frames into captioned GIF frames.
///
/// Frames must be pushed in presentation order. A frame's tick count is
/// fixed once the next frame (or [`finish`](CaptionedGifEncoder::finish))
/// arrives. Frames covering no tick are dropped. A frame whose ticks round
/// to less than [`MIN_FRAME_DELAY`] absorbs the following frames' ticks
/// until it reaches that delay, so no written delay is below it.
pub struct CaptionedGifEncoder<W: Write> {
    writer: GifWriter<W>,
    caption: RgbaImage,
    schedule: FrameSchedule,
    current: Option<PendingFrame>,
    ready: Option<ReadyFrame>,
    assigned_ticks: u64,
    source_frames: u64,
}

impl<W: Write> CaptionedGifEncoder<W> {
    /// Wrap a GIF writer. `caption` is drawn onto every written frame.
    pub fn new(writer: GifWriter<W>, caption: RgbaImage, schedule: FrameSchedule) -> Self {
        Self {
            writer,
            caption,
            schedule,
            current: None,
            ready: None,
            assigned_ticks: 0,
            source_frames: 0,
        }
    }

    /// Accept the next decoded frame, shown from `timestamp` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::GifEncodeError`] if writing the previous frame
    /// fails.
    pub fn push(&mut self, timestamp: f64, image: RgbaImage) -> Result<(), RenderError> {
        self.source_frames += 1;
        let claimed = self.schedule.advance_to(timestamp);
        let orphaned = match self.current.as_mut() {
            Some(current) => {
                current.ticks += claimed;
                0
            }
            None => claimed,
        };
        self.flush_current()?;
        self.current = Some(PendingFrame {
            image,
            ticks: orphaned,
        });
        Ok(())
    }

    /// Source frames pushed so far.
    pub fn source_frames(&self) -> u64 {
        self.source_frames
    }

    /// Output ticks in the whole window.
    pub fn total_ticks(&self) -> u64 {
        self.schedule.total_ticks()
    }

    /// Progress snapshot for callbacks.
    pub fn progress_info(&self, started: Instant, current_timestamp: Option<f64>) -> ProgressInfo {
        ProgressInfo {
            current: self.assigned_ticks,
            total: Some(self.schedule.total_ticks()),
            elapsed: started.elapsed(),
            current_timestamp,
        }
    }

    /// Give the remaining ticks to the last frame, write it, and close the
    /// GIF. Returns the writer and the number of GIF frames written.
    ///
    /// # Errors
    ///
    /// - [`RenderError::NoFrames`] if nothing was written.
    /// - [`RenderError::GifEncodeError`] if the GIF cannot be finished.
    pub fn finish(mut self) -> Result<(W, u64), RenderError> {
        let remaining = self.schedule.finish();
        if let Some(current) = self.current.as_mut() {
            current.ticks += remaining;
        }
        self.flush_current()?;
        self.write_ready()?;

        let frames = self.writer.frames_written();
        if frames == 0 {
            let start = self.schedule.tick_time(0);
            let end = self.schedule.tick_time(self.schedule.total_ticks());
            return Err(RenderError::NoFrames { start, end });
        }
        Ok((self.writer.finish()?, frames))
    }

    fn flush_current(&mut self) -> Result<(), RenderError> {
        let Some(PendingFrame { image, ticks }) = self.current.take() else {
            return Ok(());
        };
        if ticks == 0 {
            return Ok(());
        }
        if let Some(ready) = self.ready.as_mut() {
            let delay = self.schedule.delay_centiseconds(ready.first_tick, ready.ticks);
            if delay < MIN_FRAME_DELAY {
                ready.ticks += ticks;
                self.assigned_ticks += ticks;
                return Ok(());
            }
        }
        self.write_ready()?;
        self.ready = Some(ReadyFrame {
            image,
            first_tick: self.assigned_ticks,
            ticks,
        });
        self.assigned_ticks += ticks;
        Ok(())
    }

    /// Only the last frame of a window can still be short here; it is
    /// stretched to [`MIN_FRAME_DELAY`].
    fn write_ready(&mut self) -> Result<(), RenderError> {
        let Some(ReadyFrame {
            mut image,
            first_tick,
            ticks,
        }) = self.ready.take()
        else {
            return Ok(());
        };
        let delay = self
            .schedule
            .delay_centiseconds(first_tick, ticks)
            .max(MIN_FRAME_DELAY);
        overlay::composite(&mut image, &self.caption);
        self.writer.write_frame(&image, delay)
    }
}
