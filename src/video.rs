//! Sub-clip decoding.
//!
//! [`VideoClip`] opens a video with FFmpeg, caches its stream metadata, and
//! decodes the frames of a `[start, end)` window, scaled and converted to
//! RGBA, one at a time through a callback. Nothing outside the window is
//! converted, apart from the last frame before `start`, which is still on
//! screen when the window opens.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbaImage;

use crate::{error::RenderError, metadata::VideoMetadata, timing};

/// An opened video file.
///
/// The demuxer context is closed when the clip is dropped.
pub struct VideoClip {
    input_context: Input,
    metadata: VideoMetadata,
    video_stream_index: usize,
    /// Stream start time in seconds, subtracted from every frame timestamp.
    start_offset: f64,
    file_path: PathBuf,
}

impl Debug for VideoClip {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoClip")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("start_offset", &self.start_offset)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoClip {
    /// Open a video file and read the metadata of its best video stream.
    ///
    /// # Errors
    ///
    /// - [`RenderError::FileOpen`] if FFmpeg cannot open or probe the file.
    /// - [`RenderError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        let open_error = |reason: String| RenderError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(RenderError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 && frame_rate.numerator() != 0 {
            f64::from(frame_rate)
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                f64::from(rate)
            } else {
                0.0
            }
        };

        let time_base = stream.time_base();
        // i64::MIN is AV_NOPTS_VALUE.
        let start_offset = match stream.start_time() {
            i64::MIN => 0.0,
            start => timing::pts_to_seconds(start, time_base),
        };

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            duration,
            codec: decoder
                .codec()
                .map(|codec| codec.name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            format: input_context.format().name().to_string(),
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps [{}], stream {}",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.codec,
            video_stream_index,
        );

        Ok(Self {
            input_context,
            metadata,
            video_stream_index,
            start_offset,
            file_path,
        })
    }

    /// Cached metadata of the video stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Decode the frames shown during `[start, end)` seconds.
    ///
    /// Frames are scaled by `scale` on both axes, converted to RGBA and
    /// passed to `handler` in presentation order together with their
    /// timestamp in seconds. The first frame may be timestamped before
    /// `start`: it is the frame on screen when the window opens.
    ///
    /// Returns the number of frames passed to `handler`.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidWindow`] if `start >= end`.
    /// - [`RenderError::FfmpegError`] / [`RenderError::VideoDecodeError`] if
    ///   seeking, decoding, or scaling fails.
    /// - Any error returned by `handler`.
    pub fn decode_window<F>(
        &mut self,
        start: f64,
        end: f64,
        scale: f64,
        mut handler: F,
    ) -> Result<u64, RenderError>
    where
        F: FnMut(f64, RgbaImage) -> Result<(), RenderError>,
    {
        if !(start < end) {
            return Err(RenderError::InvalidWindow { start, end });
        }

        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(RenderError::NoVideoStream)?;
        let time_base = stream.time_base();
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let (width, height) = scaled_dimensions(decoder.width(), decoder.height(), scale);
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;
        log::debug!(
            "Decoding {start:.3}s..{end:.3}s at {width}x{height} (scale {scale})"
        );

        if start > 0.0 {
            let target = timing::seconds_to_seek_timestamp(start + self.start_offset);
            self.input_context.seek(target, ..target)?;
        }

        let mut window = WindowFilter {
            start,
            end,
            held: None,
            scaler,
            converted: VideoFrame::empty(),
            width,
            height,
            emitted: 0,
        };
        let mut decoded_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            if receive_frames(
                &mut decoder,
                &mut decoded_frame,
                &mut window,
                time_base,
                self.start_offset,
                &mut handler,
            )? {
                return window.finish(&mut handler);
            }
        }

        decoder.send_eof()?;
        receive_frames(
            &mut decoder,
            &mut decoded_frame,
            &mut window,
            time_base,
            self.start_offset,
            &mut handler,
        )?;
        window.finish(&mut handler)
    }
}

/// Output size for a uniform scale factor, never smaller than 1x1.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_axis = |value: u32| ((value as f64 * scale).round() as u32).max(1);
    (scale_axis(width), scale_axis(height))
}

/// Drain every frame the decoder has ready. Returns `true` once a frame at
/// or after the window end has been seen.
fn receive_frames<F>(
    decoder: &mut VideoDecoder,
    decoded_frame: &mut VideoFrame,
    window: &mut WindowFilter,
    time_base: ffmpeg_next::Rational,
    start_offset: f64,
    handler: &mut F,
) -> Result<bool, RenderError>
where
    F: FnMut(f64, RgbaImage) -> Result<(), RenderError>,
{
    while decoder.receive_frame(decoded_frame).is_ok() {
        let Some(pts) = decoded_frame.timestamp().or(decoded_frame.pts()) else {
            continue;
        };
        let timestamp = timing::pts_to_seconds(pts, time_base) - start_offset;
        if window.push(timestamp, decoded_frame, handler)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Keeps the frames of a window and converts them on the way out.
struct WindowFilter {
    start: f64,
    end: f64,
    /// Latest frame at or before `start`, not yet emitted.
    held: Option<(f64, VideoFrame)>,
    scaler: ScalingContext,
    converted: VideoFrame,
    width: u32,
    height: u32,
    emitted: u64,
}

impl WindowFilter {
    fn push<F>(
        &mut self,
        timestamp: f64,
        frame: &VideoFrame,
        handler: &mut F,
    ) -> Result<bool, RenderError>
    where
        F: FnMut(f64, RgbaImage) -> Result<(), RenderError>,
    {
        if timestamp >= self.end {
            return Ok(true);
        }
        if timestamp <= self.start {
            self.held = Some((timestamp, frame.clone()));
            return Ok(false);
        }
        if let Some((held_timestamp, held_frame)) = self.held.take() {
            self.emit(held_timestamp, &held_frame, handler)?;
        }
        self.emit(timestamp, frame, handler)?;
        Ok(false)
    }

    fn finish<F>(mut self, handler: &mut F) -> Result<u64, RenderError>
    where
        F: FnMut(f64, RgbaImage) -> Result<(), RenderError>,
    {
        if let Some((held_timestamp, held_frame)) = self.held.take() {
            self.emit(held_timestamp, &held_frame, handler)?;
        }
        Ok(self.emitted)
    }

    fn emit<F>(
        &mut self,
        timestamp: f64,
        frame: &VideoFrame,
        handler: &mut F,
    ) -> Result<(), RenderError>
    where
        F: FnMut(f64, RgbaImage) -> Result<(), RenderError>,
    {
        self.scaler.run(frame, &mut self.converted)?;
        let image = convert_frame_to_image(&self.converted, self.width, self.height)?;
        self.emitted += 1;
        handler(timestamp, image)
    }
}

/// Copy a scaled RGBA frame into an [`RgbaImage`], dropping row padding.
fn convert_frame_to_image(
    rgba_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<RgbaImage, RenderError> {
    let stride = rgba_frame.stride(0);
    let row_bytes = width as usize * 4;
    let data = rgba_frame.data(0);

    let buffer = if stride == row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    };

    RgbaImage::from_raw(width, height, buffer).ok_or_else(|| {
        RenderError::VideoDecodeError(
            "Failed to construct RGBA image from decoded frame data".to_string(),
        )
    })
}
