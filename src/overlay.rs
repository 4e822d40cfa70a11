//! Caption overlay rendering.
//!
//! The caption is laid out with [`fontdue`], each line centered, and
//! rasterized into a transparent RGBA layer. The outline is the glyph
//! coverage dilated by the stroke width and painted underneath the fill.
//! [`composite`] draws the layer horizontally centered and bottom-aligned
//! on a video frame.

use fontdue::Font;
use fontdue::layout::{
    CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, WrapStyle,
};
use image::{GrayImage, Luma, Rgba, RgbaImage, imageops};

use crate::color::parse_color;
use crate::configuration::Configuration;
use crate::error::RenderError;

/// How the caption is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Glyph fill color.
    pub fill: Rgba<u8>,
    /// Outline color.
    pub stroke: Rgba<u8>,
    /// Outline width in pixels. Zero draws no outline.
    pub stroke_width: u32,
}

impl CaptionStyle {
    /// Build the caption style from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedColor`] if either color does not
    /// parse.
    pub fn from_configuration(config: &Configuration) -> Result<Self, RenderError> {
        Ok(Self {
            font_size: config.font_size as f32,
            fill: parse_color(&config.font_color)?,
            stroke: parse_color(&config.stroke_color)?,
            stroke_width: config.stroke_width,
        })
    }
}

/// Rasterize `text` into a tightly sized transparent layer.
///
/// Lines separated by `\n` are centered against the widest line. The layer
/// is padded by the stroke width so the outline is never clipped.
pub fn render_caption(font: &Font, text: &str, style: &CaptionStyle) -> RgbaImage {
    let padding = style.stroke_width + 1;

    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, style.font_size, 0));

    let text_width = layout
        .glyphs()
        .iter()
        .map(|glyph| glyph.x + glyph.width as f32)
        .fold(0.0_f32, f32::max);
    let text_height = layout.height();

    if text_width > 0.0 {
        layout.reset(&LayoutSettings {
            max_width: Some(text_width.ceil() + 1.0),
            horizontal_align: HorizontalAlign::Center,
            wrap_style: WrapStyle::Letter,
            wrap_hard_breaks: true,
            ..LayoutSettings::default()
        });
        layout.append(&[font], &TextStyle::new(text, style.font_size, 0));
    }

    let width = text_width.ceil().max(0.0) as u32 + 1 + 2 * padding;
    let height = text_height.ceil().max(0.0) as u32 + 2 * padding;
    let mut coverage = GrayImage::new(width, height);

    for glyph in layout.glyphs() {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let (metrics, bitmap) = font.rasterize_config(glyph.key);
        let origin_x = glyph.x.round() as i64 + padding as i64;
        let origin_y = glyph.y.round() as i64 + padding as i64;

        for (offset, &value) in bitmap.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let x = origin_x + (offset % metrics.width) as i64;
            let y = origin_y + (offset / metrics.width) as i64;
            if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                continue;
            }
            let pixel = coverage.get_pixel_mut(x as u32, y as u32);
            pixel.0[0] = pixel.0[0].max(value);
        }
    }

    paint_layer(&coverage, style)
}

/// Color a coverage mask: outline first, fill on top.
pub fn paint_layer(coverage: &GrayImage, style: &CaptionStyle) -> RgbaImage {
    let outline = (style.stroke_width > 0).then(|| dilate(coverage, style.stroke_width));

    RgbaImage::from_fn(coverage.width(), coverage.height(), |x, y| {
        let mut pixel = Rgba([0, 0, 0, 0]);
        if let Some(outline) = &outline {
            pixel = blend_over(pixel, style.stroke, outline.get_pixel(x, y).0[0]);
        }
        blend_over(pixel, style.fill, coverage.get_pixel(x, y).0[0])
    })
}

/// Grow a coverage mask by `radius` pixels using a disc-shaped kernel.
pub fn dilate(mask: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    let r = radius as i64;
    let offsets: Vec<(i64, i64)> = (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
        .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
        .collect();
    let (width, height) = (mask.width() as i64, mask.height() as i64);

    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        let value = offsets
            .iter()
            .filter_map(|(dx, dy)| {
                let (sx, sy) = (x as i64 + dx, y as i64 + dy);
                (sx >= 0 && sy >= 0 && sx < width && sy < height)
                    .then(|| mask.get_pixel(sx as u32, sy as u32).0[0])
            })
            .max()
            .unwrap_or(0);
        Luma([value])
    })
}

/// Source-over blend of `color`, scaled by `coverage`, onto `base`.
pub fn blend_over(base: Rgba<u8>, color: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    let source_alpha = (color.0[3] as f32 / 255.0) * (coverage as f32 / 255.0);
    if source_alpha <= 0.0 {
        return base;
    }
    let base_alpha = base.0[3] as f32 / 255.0;
    let out_alpha = source_alpha + base_alpha * (1.0 - source_alpha);

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let source = color.0[channel] as f32 * source_alpha;
        let below = base.0[channel] as f32 * base_alpha * (1.0 - source_alpha);
        out[channel] = ((source + below) / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Top-left position that centers a caption horizontally and rests it on
/// the bottom edge of the frame.
pub fn caption_position(frame: (u32, u32), caption: (u32, u32)) -> (i64, i64) {
    let x = (frame.0 as i64 - caption.0 as i64) / 2;
    let y = frame.1 as i64 - caption.1 as i64;
    (x, y)
}

/// Alpha-blend `caption` onto `frame` at the caption position.
pub fn composite(frame: &mut RgbaImage, caption: &RgbaImage) {
    let (x, y) = caption_position(frame.dimensions(), caption.dimensions());
    imageops::overlay(frame, caption, x, y);
}
