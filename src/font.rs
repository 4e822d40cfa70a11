//! Font lookup.
//!
//! `--font` takes either a path to a font file or a family name such as
//! `arial` or `DejaVu Sans`. Names are resolved against the font files in
//! the usual system and per-user font directories. A family that is not
//! installed (the default `arial` on most Linux systems) falls back to the
//! first installed entry of [`FALLBACK_FONTS`] with a warning. A value that
//! looks like a path never falls back.

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use walkdir::WalkDir;

use crate::error::RenderError;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Families tried, in order, when the requested one is not installed.
pub const FALLBACK_FONTS: &[&str] = &[
    "DejaVuSans",
    "LiberationSans",
    "FreeSans",
    "NotoSans",
    "Arial",
    "Helvetica",
];

/// Directories searched for fonts, most specific first.
pub fn font_search_directories() -> Vec<PathBuf> {
    let mut directories = Vec::new();
    if let Some(user_fonts) = dirs::font_dir() {
        directories.push(user_fonts);
    }
    if let Some(home) = dirs::home_dir() {
        directories.push(home.join(".fonts"));
    }
    directories.extend(SYSTEM_FONT_DIRECTORIES.iter().map(PathBuf::from));
    directories.retain(|directory| directory.is_dir());
    directories
}

/// Find the font file for a family name under `directories`.
///
/// Comparison ignores case, spaces, hyphens and underscores. A file whose
/// stem equals the name wins; otherwise the shortest stem starting with the
/// name is taken (`arial` matches `Arial.ttf` before `ArialBold.ttf`).
pub fn find_font_file(name: &str, directories: &[PathBuf]) -> Option<PathBuf> {
    let wanted = normalize_font_name(name);
    if wanted.is_empty() {
        return None;
    }

    let mut best_prefix: Option<(usize, PathBuf)> = None;

    for directory in directories {
        let walker = WalkDir::new(directory)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file());

        for entry in walker {
            let path = entry.path();
            if !has_font_extension(path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let stem = normalize_font_name(stem);

            if stem == wanted {
                return Some(path.to_path_buf());
            }
            if stem.starts_with(&wanted)
                && best_prefix
                    .as_ref()
                    .is_none_or(|(length, _)| stem.len() < *length)
            {
                best_prefix = Some((stem.len(), path.to_path_buf()));
            }
        }
    }

    best_prefix.map(|(_, path)| path)
}

/// Resolve `--font` to a font file.
///
/// An existing file is used as is. Anything else containing a path
/// separator or ending in a font extension is a missing file. Otherwise the
/// value is a family name looked up under `directories`, falling back to
/// [`FALLBACK_FONTS`].
///
/// # Errors
///
/// Returns [`RenderError::FontError`] if a path does not exist, or neither
/// the family nor any fallback is installed.
pub fn resolve_font_path(name: &str, directories: &[PathBuf]) -> Result<PathBuf, RenderError> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }
    if direct.components().count() > 1 || has_font_extension(direct) {
        return Err(RenderError::FontError(format!(
            "font file {} not found",
            direct.display()
        )));
    }
    if let Some(path) = find_font_file(name, directories) {
        return Ok(path);
    }

    let fallback = FALLBACK_FONTS
        .iter()
        .find_map(|family| find_font_file(family, directories));
    match fallback {
        Some(path) => {
            log::warn!(
                "No font named {name:?} is installed; using {} instead",
                path.display()
            );
            Ok(path)
        }
        None => Err(RenderError::FontError(format!(
            "no font named {name:?} (or any of {}) in {}",
            FALLBACK_FONTS.join(", "),
            directories
                .iter()
                .map(|directory| directory.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Load a font by file path or family name, prepared for `size` pixels.
///
/// # Errors
///
/// Returns [`RenderError::FontError`] if no font can be resolved (see
/// [`resolve_font_path`]) or the file is not a usable font.
pub fn load_font(name: &str, size: f32) -> Result<Font, RenderError> {
    let path = resolve_font_path(name, &font_search_directories())?;
    log::debug!("Using font {} for {name:?}", path.display());

    let bytes = std::fs::read(&path)
        .map_err(|error| RenderError::FontError(format!("{}: {error}", path.display())))?;
    let settings = FontSettings {
        scale: size,
        ..FontSettings::default()
    };
    Font::from_bytes(bytes, settings)
        .map_err(|error| RenderError::FontError(format!("{}: {error}", path.display())))
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            FONT_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

fn normalize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
