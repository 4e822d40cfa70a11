//! Video stream metadata.
//!
//! Read once when a [`VideoClip`](crate::VideoClip) is opened and cached
//! for the lifetime of the clip.

use std::time::Duration;

use serde::Serialize;

/// Metadata for the video stream used as the GIF source.
#[derive(Debug, Clone, Serialize)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Container duration.
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub format: String,
}

fn serialize_seconds<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
