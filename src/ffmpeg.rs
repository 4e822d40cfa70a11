//! FFmpeg console verbosity.
//!
//! FFmpeg writes its own diagnostics straight to stderr, outside the `log`
//! facade. Seeking into the middle of a stream makes decoders complain
//! about missing reference frames until the next keyframe, so a run keeps
//! FFmpeg at [`FfmpegLogLevel::Error`] unless `--verbose` or `--log-level`
//! asks for more.

use clap::ValueEnum;
use ffmpeg_next::util::log::Level;

/// Severity threshold for FFmpeg's console output, quietest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Only conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors, such as a corrupt packet. The default.
    Error,
    /// Warnings, including missing references after a seek. Default with
    /// `--verbose`.
    #[value(alias = "warn")]
    Warning,
    /// Informational messages.
    Info,
    /// More detailed informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Everything, including per-packet tracing.
    Trace,
}

impl FfmpegLogLevel {
    /// Level used when `--log-level` is not given.
    pub fn for_run(verbose: bool) -> Self {
        if verbose {
            FfmpegLogLevel::Warning
        } else {
            FfmpegLogLevel::Error
        }
    }
}

impl From<FfmpegLogLevel> for Level {
    fn from(level: FfmpegLogLevel) -> Self {
        match level {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Apply `level` to FFmpeg's global logger. Rust-side logging is untouched.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    log::debug!("FFmpeg log level set to {level:?}");
    ffmpeg_next::util::log::set_level(level.into());
}
