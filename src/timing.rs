//! Time conversions and output frame scheduling.
//!
//! A GIF has no timestamps, only per-frame delays in hundredths of a
//! second. [`FrameSchedule`] turns decoded frame timestamps into those
//! delays: the output is a grid of ticks at `start + k / fps`, each tick
//! shows the most recent decoded frame, and runs of ticks that show the
//! same frame collapse into a single GIF frame.

use std::time::Duration;

use ffmpeg_next::Rational;

/// Convert subtitle milliseconds to seconds.
pub fn milliseconds_to_seconds(milliseconds: i64) -> f64 {
    milliseconds as f64 / 1000.0
}

/// Rescale a PTS value from stream time base to seconds.
pub fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert seconds to a seek timestamp in AV_TIME_BASE (microseconds).
///
/// `input_context.seek()` with no stream selected expects AV_TIME_BASE.
pub fn seconds_to_seek_timestamp(seconds: f64) -> i64 {
    Duration::from_secs_f64(seconds.max(0.0)).as_micros() as i64
}

/// Output tick grid over a `[start, end)` window.
#[derive(Debug, Clone)]
pub struct FrameSchedule {
    start: f64,
    frames_per_second: f64,
    total_ticks: u64,
    next_tick: u64,
}

impl FrameSchedule {
    /// Create a schedule for `[start, end)` at `frames_per_second`.
    ///
    /// A non-empty window always has at least one tick.
    pub fn new(start: f64, end: f64, frames_per_second: f64) -> Self {
        let length = (end - start).max(0.0);
        let total_ticks = if length > 0.0 && frames_per_second > 0.0 {
            // Guard against 2.0 * 10.0 landing on 20.000000000000004.
            ((length * frames_per_second) - 1e-9).ceil().max(1.0) as u64
        } else {
            0
        };
        Self {
            start,
            frames_per_second,
            total_ticks,
            next_tick: 0,
        }
    }

    /// Total number of ticks in the window.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Ticks handed out so far.
    pub fn emitted_ticks(&self) -> u64 {
        self.next_tick
    }

    /// Time of tick `k` in seconds.
    pub fn tick_time(&self, tick: u64) -> f64 {
        self.start + tick as f64 / self.frames_per_second
    }

    /// Returns `true` once every tick has been handed out.
    pub fn is_finished(&self) -> bool {
        self.next_tick >= self.total_ticks
    }

    /// Claim every pending tick strictly before `timestamp`.
    ///
    /// Returns how many ticks were claimed. Those ticks belong to whichever
    /// frame was current before `timestamp`.
    pub fn advance_to(&mut self, timestamp: f64) -> u64 {
        let mut claimed = 0;
        while self.next_tick < self.total_ticks && self.tick_time(self.next_tick) < timestamp {
            self.next_tick += 1;
            claimed += 1;
        }
        claimed
    }

    /// Claim every remaining tick.
    pub fn finish(&mut self) -> u64 {
        let remaining = self.total_ticks - self.next_tick;
        self.next_tick = self.total_ticks;
        remaining
    }

    /// GIF delay, in hundredths of a second, for the ticks
    /// `[first_tick, first_tick + count)`.
    ///
    /// Delays are differences of rounded cumulative times, so a sequence of
    /// frames always sums to the rounded window length.
    pub fn delay_centiseconds(&self, first_tick: u64, count: u64) -> u16 {
        let to_centiseconds = |tick: u64| (tick as f64 * 100.0 / self.frames_per_second).round();
        let delay = to_centiseconds(first_tick + count) - to_centiseconds(first_tick);
        delay.clamp(0.0, u16::MAX as f64) as u16
    }
}
