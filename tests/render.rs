//! End-to-end rendering tests.
//!
//! Tests require `tests/fixtures/sample_video.mp4` (see
//! `tests/fixtures/generate_fixtures.sh`) and a system TrueType font; they
//! return early when either is missing.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Mutex,
};

use subgif::{
    Configuration, NoOpProgress, ProgressCallback, ProgressInfo, RenderError, SubgifError,
    VideoClip,
    font::{FALLBACK_FONTS, find_font_file, font_search_directories},
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn system_font_path() -> Option<PathBuf> {
    let directories = font_search_directories();
    FALLBACK_FONTS
        .iter()
        .find_map(|name| find_font_file(name, &directories))
}

struct Fixture {
    directory: tempfile::TempDir,
    video: &'static str,
    font: PathBuf,
}

impl Fixture {
    fn new() -> Option<Self> {
        if !Path::new(sample_video_path()).exists() {
            return None;
        }
        Some(Self {
            directory: tempfile::tempdir().expect("create temp dir"),
            video: sample_video_path(),
            font: system_font_path()?,
        })
    }

    fn subtitles(&self) -> PathBuf {
        let path = self.directory.path().join("sample.srt");
        std::fs::write(
            &path,
            "1\n00:00:00,000 --> 00:00:00,900\nOpening line\n\n\
             2\n00:00:01,000 --> 00:00:02,000\nHello there\n\n\
             3\n01:00:00,000 --> 01:00:01,000\nLong after the end\n",
        )
        .expect("write subtitles");
        path
    }

    fn output(&self) -> PathBuf {
        self.directory.path().join("out.gif")
    }

    fn config(&self, extra: &[&str]) -> Configuration {
        let subtitles = self.subtitles();
        let output = self.output();
        let mut args = vec![
            "subgif".to_string(),
            self.video.to_string(),
            subtitles.display().to_string(),
            "--gif".to_string(),
            output.display().to_string(),
            "--font".to_string(),
            self.font.display().to_string(),
        ];
        args.extend(extra.iter().map(|arg| arg.to_string()));
        Configuration::from_args(args).expect("parse configuration")
    }
}

fn gif_delays(path: &Path) -> (u16, u16, Vec<u16>) {
    let file = BufReader::new(File::open(path).expect("open GIF"));
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(file).expect("read GIF header");
    let (width, height) = (decoder.width(), decoder.height());
    let mut delays = Vec::new();
    while let Some(frame) = decoder.read_next_frame().expect("read GIF frame") {
        delays.push(frame.delay);
    }
    (width, height, delays)
}

#[test]
fn metadata_is_read() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let clip = VideoClip::open(path).expect("open sample video");
    let metadata = clip.metadata();
    assert!(metadata.width > 0);
    assert!(metadata.height > 0);
    assert!(metadata.frames_per_second > 0.0);
    assert!(metadata.duration.as_secs_f64() > 2.0);
}

#[test]
fn render_selected_subtitle() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let config = fixture.config(&["--sub-number", "1", "--resize", "0.5", "--fps", "10"]);

    let summary = subgif::convert(&config, &NoOpProgress).expect("convert");
    assert_eq!(summary.output, fixture.output());
    assert_eq!(summary.subtitle_index, 1);
    assert_eq!(summary.text, "Hello there");
    assert_eq!(summary.start_seconds, 1.0);
    assert_eq!(summary.end_seconds, 2.0);
    assert_eq!(summary.frames_per_second, 10.0);
    assert!(summary.source_frames > 0);

    let (width, height, delays) = gif_delays(&summary.output);
    assert_eq!(u32::from(width), summary.width);
    assert_eq!(u32::from(height), summary.height);
    assert_eq!(
        (summary.width, summary.height),
        subgif::video::scaled_dimensions(summary.source.width, summary.source.height, 0.5)
    );
    assert_eq!(delays.len() as u64, summary.gif_frames);
    assert_eq!(delays.iter().map(|&d| u32::from(d)).sum::<u32>(), 100);
}

#[test]
fn render_by_display_text_at_source_rate() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let config = fixture.config(&["--display-text", "Opening", "--resize", "0.25", "--capital"]);

    let summary = subgif::convert(&config, &NoOpProgress).expect("convert");
    assert_eq!(summary.subtitle_index, 0);
    assert_eq!(summary.text, "OPENING");
    assert_eq!(summary.frames_per_second, summary.source.frames_per_second);

    let ticks = (0.9 * summary.frames_per_second - 1e-9).ceil();
    let expected = (ticks * 100.0 / summary.frames_per_second).round() as u32;
    let delays = gif_delays(&summary.output).2;
    assert_eq!(delays.iter().map(|&d| u32::from(d)).sum::<u32>(), expected);
}

#[test]
fn second_render_refuses_to_overwrite() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let config = fixture.config(&["--sub-number", "1", "--resize", "0.25", "--fps", "5"]);
    subgif::convert(&config, &NoOpProgress).expect("first convert");

    let error = subgif::convert(&config, &NoOpProgress).expect_err("second convert");
    assert!(matches!(
        error,
        SubgifError::Render(RenderError::OutputExists(_))
    ));

    let config = fixture.config(&[
        "--sub-number",
        "1",
        "--resize",
        "0.25",
        "--fps",
        "5",
        "--overwrite",
    ]);
    subgif::convert(&config, &NoOpProgress).expect("overwriting convert");
}

#[test]
fn window_past_the_end_fails() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let config = fixture.config(&["--sub-number", "2", "--resize", "0.25"]);

    let error = subgif::convert(&config, &NoOpProgress).expect_err("window past the end");
    assert!(matches!(
        error,
        SubgifError::Render(RenderError::NoFrames { .. })
    ));
    assert_eq!(error.exit_code(), 1);
    assert!(!fixture.output().exists());
}

#[test]
fn failed_encode_removes_partial_output() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    // Passes every check up front; the GIF file is created and then the
    // writer rejects a frame wider than 65535 pixels.
    let config = fixture.config(&["--sub-number", "1", "--resize", "1000", "--fps", "5"]);

    let error = subgif::convert(&config, &NoOpProgress).expect_err("oversized GIF");
    match &error {
        SubgifError::Render(RenderError::GifEncodeError(message)) => {
            assert!(message.contains("65535"), "unexpected message {message:?}");
        }
        other => panic!("expected GIF encode error, got {other:?}"),
    }
    assert_eq!(error.exit_code(), 1);
    assert!(!fixture.output().exists());
}

#[derive(Default)]
struct RecordingProgress {
    updates: Mutex<Vec<u64>>,
    finished: Mutex<Option<ProgressInfo>>,
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push(info.current);
        }
    }

    fn on_finish(&self, info: &ProgressInfo) {
        if let Ok(mut finished) = self.finished.lock() {
            *finished = Some(info.clone());
        }
    }
}

#[test]
fn progress_is_reported() {
    let Some(fixture) = Fixture::new() else {
        return;
    };
    let config = fixture.config(&["--sub-number", "1", "--resize", "0.25", "--fps", "10"]);
    let progress = RecordingProgress::default();

    subgif::convert(&config, &progress).expect("convert");

    let updates = progress.updates.lock().expect("lock updates");
    assert!(!updates.is_empty());
    assert!(updates.windows(2).all(|pair| pair[0] <= pair[1]));

    let finished = progress.finished.lock().expect("lock finished");
    let finished = finished.as_ref().expect("on_finish called");
    assert_eq!(finished.current, 10);
    assert_eq!(finished.total, Some(10));
    assert_eq!(finished.percentage(), Some(100.0));
}
