//! Caption color parsing.
//!
//! Accepts the common CSS/X11 color names and `#rgb`, `#rrggbb` and
//! `#rrggbbaa` hex notation.

use image::Rgba;

use crate::error::RenderError;

const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("aqua", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("fuchsia", [255, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("darkgray", [169, 169, 169, 255]),
    ("darkgrey", [169, 169, 169, 255]),
    ("lightgray", [211, 211, 211, 255]),
    ("lightgrey", [211, 211, 211, 255]),
    ("silver", [192, 192, 192, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("olive", [128, 128, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("purple", [128, 0, 128, 255]),
    ("teal", [0, 128, 128, 255]),
    ("orange", [255, 165, 0, 255]),
    ("gold", [255, 215, 0, 255]),
    ("pink", [255, 192, 203, 255]),
    ("brown", [165, 42, 42, 255]),
    ("transparent", [0, 0, 0, 0]),
];

/// Parse a color name or hex string into RGBA.
///
/// Names are matched case-insensitively, ignoring spaces
/// (`"Light Gray"` == `"lightgray"`).
///
/// # Errors
///
/// Returns [`RenderError::UnsupportedColor`] for anything unrecognised.
pub fn parse_color(value: &str) -> Result<Rgba<u8>, RenderError> {
    let normalized: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    let parsed = match normalized.strip_prefix('#') {
        Some(hex) => parse_hex(hex),
        None => NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, rgba)| *rgba),
    };

    parsed
        .map(Rgba)
        .ok_or_else(|| RenderError::UnsupportedColor(value.to_string()))
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgba = [255; 4];
            for (slot, digit) in rgba.iter_mut().zip(hex.chars()) {
                let nibble = digit.to_digit(16)? as u8;
                *slot = nibble * 17;
            }
            Some(rgba)
        }
        6 => Some([channel(0)?, channel(2)?, channel(4)?, 255]),
        8 => Some([channel(0)?, channel(2)?, channel(4)?, channel(6)?]),
        _ => None,
    }
}
