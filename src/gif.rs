//! Animated GIF output.
//!
//! [`GifWriter`] streams RGBA frames into a GIF as they are produced, so a
//! clip never has to be held in memory as a whole. Each frame is quantized
//! to its own 256-color palette by the `gif` crate's NeuQuant quantizer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use gif::{Encoder, Frame, Repeat};
use image::RgbaImage;

use crate::error::RenderError;

/// Quantizer speed passed to [`Frame::from_rgba_speed`] (1 = best, 30 = fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Streaming animated GIF encoder.
pub struct GifWriter<W: Write> {
    encoder: Encoder<W>,
    width: u16,
    height: u16,
    frames_written: u64,
}

impl GifWriter<BufWriter<File>> {
    /// Create (or truncate) `path` and start a GIF of the given size.
    ///
    /// `repeat` is the loop count; `None` loops forever.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::GifEncodeError`] if the file cannot be created
    /// or the dimensions do not fit a GIF.
    pub fn create<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
        repeat: Option<u16>,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref();
        log::debug!(
            "Creating GIF file {} ({width}x{height}, repeat={repeat:?})",
            path.display()
        );
        let file = File::create(path).map_err(|e| {
            RenderError::GifEncodeError(format!(
                "Failed to create GIF file {}: {e}",
                path.display()
            ))
        })?;
        Self::new(BufWriter::new(file), width, height, repeat)
    }
}

impl<W: Write> GifWriter<W> {
    /// Start a GIF of the given size on an arbitrary writer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::GifEncodeError`] if the dimensions exceed
    /// 65535 pixels or the header cannot be written.
    pub fn new(writer: W, width: u32, height: u32, repeat: Option<u16>) -> Result<Self, RenderError> {
        let to_u16 = |value: u32| {
            u16::try_from(value).map_err(|_| {
                RenderError::GifEncodeError(format!(
                    "{width}x{height} exceeds the GIF size limit of 65535x65535"
                ))
            })
        };
        let (width, height) = (to_u16(width)?, to_u16(height)?);

        let mut encoder = Encoder::new(writer, width, height, &[]).map_err(|e| {
            RenderError::GifEncodeError(format!("Failed to create GIF encoder: {e}"))
        })?;

        let repeat = match repeat {
            None => Repeat::Infinite,
            Some(n) => Repeat::Finite(n),
        };
        encoder
            .set_repeat(repeat)
            .map_err(|e| RenderError::GifEncodeError(format!("Failed to set GIF repeat: {e}")))?;

        Ok(Self {
            encoder,
            width,
            height,
            frames_written: 0,
        })
    }

    /// Append a frame shown for `delay` hundredths of a second.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::GifEncodeError`] if the frame size differs
    /// from the GIF size or the frame cannot be written.
    pub fn write_frame(&mut self, image: &RgbaImage, delay: u16) -> Result<(), RenderError> {
        if image.dimensions() != (self.width as u32, self.height as u32) {
            return Err(RenderError::GifEncodeError(format!(
                "Frame is {}x{}, expected {}x{}",
                image.width(),
                image.height(),
                self.width,
                self.height
            )));
        }

        let mut pixels = image.as_raw().clone();
        let mut gif_frame =
            Frame::from_rgba_speed(self.width, self.height, &mut pixels, QUANTIZER_SPEED);
        gif_frame.delay = delay;

        self.encoder
            .write_frame(&gif_frame)
            .map_err(|e| RenderError::GifEncodeError(format!("Failed to write GIF frame: {e}")))?;
        self.frames_written += 1;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Write the trailer, flush, and hand back the writer.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::GifEncodeError`] if the trailer cannot be written.
    pub fn finish(self) -> Result<W, RenderError> {
        let mut writer = self
            .encoder
            .into_inner()
            .map_err(|e| RenderError::GifEncodeError(format!("Failed to finish GIF: {e}")))?;
        writer.flush()?;
        Ok(writer)
    }
}
