//! Subtitle file loading integration tests.

use std::path::Path;

use subgif::{SubgifError, SubtitleTrack, subtitle::clean_subtitle_text};
use subparse::SubtitleFormat::{SubRip, SubStationAlpha};

const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:03,500
Hello there

2
00:00:04,000 --> 00:00:06,000
General Kenobi
You are a bold one

3
00:01:02,250 --> 00:01:04,000
<i>Kill him</i>
";

const SAMPLE_ASS: &str = "[Script Info]
ScriptType: v4.00+
PlayResX: 640
PlayResY: 360

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.00,0:00:02.50,Default,,0,0,0,,{\\i1}First{\\i0} line
Dialogue: 0,0:00:03.00,0:00:05.00,Default,,0,0,0,,Top\\NBottom
";

fn write_fixture(directory: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = directory.join(name);
    std::fs::write(&path, content).expect("write subtitle fixture");
    path
}

#[test]
fn load_srt_entries_in_file_order() {
    let directory = tempfile::tempdir().expect("create temp dir");
    let path = write_fixture(directory.path(), "sample.srt", SAMPLE_SRT);

    let track = SubtitleTrack::load(&path, 25.0).expect("load srt");
    assert_eq!(track.len(), 3);
    assert!(!track.is_empty());

    let first = track.get(0).expect("first entry");
    assert_eq!(first.index, 0);
    assert_eq!(first.start_ms, 1000);
    assert_eq!(first.end_ms, 3500);
    assert_eq!(first.start_seconds(), 1.0);
    assert_eq!(first.end_seconds(), 3.5);
    assert_eq!(first.text, "Hello there");

    let second = track.get(1).expect("second entry");
    assert_eq!(second.text, "General Kenobi\nYou are a bold one");

    let third = track.get(2).expect("third entry");
    assert_eq!(third.start_ms, 62_250);
    assert_eq!(third.end_ms, 64_000);

    let indices: Vec<usize> = track.iter().map(|entry| entry.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn load_srt_with_byte_order_mark() {
    let directory = tempfile::tempdir().expect("create temp dir");
    let path = write_fixture(
        directory.path(),
        "bom.srt",
        &format!("\u{feff}{SAMPLE_SRT}"),
    );

    let track = SubtitleTrack::load(&path, 25.0).expect("load srt with BOM");
    assert_eq!(track.len(), 3);
    assert_eq!(track.get(0).map(|entry| entry.text.as_str()), Some("Hello there"));
}

#[test]
fn load_ass_strips_override_tags() {
    let directory = tempfile::tempdir().expect("create temp dir");
    let path = write_fixture(directory.path(), "sample.ass", SAMPLE_ASS);

    let track = SubtitleTrack::load(&path, 25.0).expect("load ass");
    assert_eq!(track.len(), 2);

    let first = track.get(0).expect("first entry");
    assert_eq!(first.start_ms, 1000);
    assert_eq!(first.end_ms, 2500);
    assert_eq!(first.text, "First line");

    let second = track.get(1).expect("second entry");
    assert_eq!(second.text, "Top\nBottom");
}

#[test]
fn missing_file_is_a_load_error() {
    let result = SubtitleTrack::load("this_file_does_not_exist.srt", 25.0);
    match result {
        Err(error @ SubgifError::SubtitleLoad { .. }) => {
            assert_eq!(error.exit_code(), 1);
            assert!(error.to_string().contains("this_file_does_not_exist.srt"));
        }
        other => panic!("expected subtitle load error, got {other:?}"),
    }
}

#[test]
fn unknown_format_is_a_load_error() {
    let directory = tempfile::tempdir().expect("create temp dir");
    let path = write_fixture(directory.path(), "notes.xyz", "just some prose\n");

    let result = SubtitleTrack::load(&path, 25.0);
    assert!(matches!(result, Err(SubgifError::SubtitleLoad { .. })));
}

#[test]
fn load_srt_keeps_literal_braces() {
    let directory = tempfile::tempdir().expect("create temp dir");
    let path = write_fixture(
        directory.path(),
        "braces.srt",
        "1\n00:00:01,000 --> 00:00:02,000\nUse {braces} here\n\n2\n00:00:03,000 --> 00:00:04,000\nC:\\Names\\here\n",
    );

    let track = SubtitleTrack::load(&path, 25.0).expect("load srt");
    assert_eq!(track.get(0).map(|e| e.text.as_str()), Some("Use {braces} here"));
    assert_eq!(track.get(1).map(|e| e.text.as_str()), Some("C:\\Names\\here"));
}

#[test]
fn clean_text_removes_override_blocks() {
    assert_eq!(
        clean_subtitle_text("{\\an8}{\\b1}Bold{\\b0} move", SubStationAlpha),
        "Bold move"
    );
}

#[test]
fn clean_text_leaves_braces_outside_ssa() {
    assert_eq!(
        clean_subtitle_text("Set {x} to {\\b1}", SubRip),
        "Set {x} to {\\b1}"
    );
}

#[test]
fn clean_text_converts_line_breaks() {
    assert_eq!(
        clean_subtitle_text("One\\NTwo\\nThree", SubStationAlpha),
        "One\nTwo\nThree"
    );
    assert_eq!(clean_subtitle_text("Windows\r\nbreak", SubRip), "Windows\nbreak");
}

#[test]
fn clean_text_turns_hard_spaces_into_spaces() {
    assert_eq!(clean_subtitle_text("non\\hbreaking", SubStationAlpha), "non breaking");
}

#[test]
fn clean_text_trims_each_line() {
    assert_eq!(clean_subtitle_text("  padded  \n  lines ", SubRip), "padded\nlines");
}

#[test]
fn clean_text_keeps_plain_text() {
    assert_eq!(clean_subtitle_text("I'll be back.", SubRip), "I'll be back.");
    assert_eq!(clean_subtitle_text("I'll be back.", SubStationAlpha), "I'll be back.");
}
