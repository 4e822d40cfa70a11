//! Render progress reporting.
//!
//! [`render`](crate::render::render) reports how many output ticks have
//! been assigned to frames through a [`ProgressCallback`], once per decoded
//! source frame. Callbacks observe; they
//! cannot stop the render.
//!
//! # Example
//!
//! ```
//! use subgif::{ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage() {
//!             println!("{pct:.1}% of the GIF written");
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

/// A snapshot of render progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Output ticks assigned to frames so far.
    pub current: u64,
    /// Total output ticks in the window, if known.
    pub total: Option<u64>,
    /// Wall-clock time elapsed since decoding started.
    pub elapsed: Duration,
    /// Timestamp of the source frame just decoded, in seconds.
    pub current_timestamp: Option<f64>,
}

impl ProgressInfo {
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub fn percentage(&self) -> Option<f32> {
        self.total
            .filter(|total| *total > 0)
            .map(|total| (self.current as f32 / total as f32 * 100.0).min(100.0))
    }
}

/// Receives progress updates during a render.
pub trait ProgressCallback {
    /// Called after every decoded source frame is handed to the encoder.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called once after the last GIF frame is written.
    fn on_finish(&self, _info: &ProgressInfo) {}
}

/// Discards all progress notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}
