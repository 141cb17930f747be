/*!
 * Tests for the SRT, VTT and ASS parsers and serializers
 */

use subtitle_translator::errors::SubtitleError;
use subtitle_translator::subtitle::{self, SubtitleEntry, SubtitleFile, SubtitleFormat, ass, srt, vtt};

use crate::common::{SAMPLE_ASS, SAMPLE_SRT, SAMPLE_VTT};

#[test]
fn test_srtParse_withSample_shouldReadAllEntries() {
    let file = srt::parse(SAMPLE_SRT, "sample.srt");

    assert_eq!(file.format, SubtitleFormat::Srt);
    assert_eq!(file.entries.len(), 3);
    assert_eq!(file.entries[1].id, 2);
    assert_eq!(file.entries[1].start_time_ms, 5000);
    assert_eq!(file.entries[1].end_time_ms, 9000);
    assert_eq!(file.entries[1].text, "It contains multiple entries.");
    assert_eq!(file.entries[1].original_text, file.entries[1].text);
}

#[test]
fn test_srtParse_withBomAndLongHours_shouldParse() {
    let content = "\u{feff}1\n100:00:00,001 --> 100:00:01,000\nLate line\n";
    let file = srt::parse(content, "late.srt");
    assert_eq!(file.entries.len(), 1);
    assert_eq!(file.entries[0].start_time_ms, 360_000_001);
}

#[test]
fn test_srtParse_withEndBeforeStart_shouldDropEntry() {
    let content = "1\n00:00:05,000 --> 00:00:01,000\nBackwards\n\n2\n00:00:06,000 --> 00:00:07,000\nFine";
    let file = srt::parse(content, "a.srt");
    assert_eq!(file.entries.len(), 1);
    assert_eq!(file.entries[0].text, "Fine");
}

#[test]
fn test_srtSerialize_withTranslation_shouldWriteTranslatedText() {
    let mut file = srt::parse(SAMPLE_SRT, "sample.srt");
    file.entries[0].translated_text = Some("Ceci est un test.".to_string());

    let output = srt::serialize(&file);
    assert!(output.starts_with("1\n00:00:01,000 --> 00:00:04,000\nCeci est un test.\n\n2\n"));
    assert!(output.contains("For testing purposes."));
}

#[test]
fn test_vttParse_withCueSettingsAndNotes_shouldKeepOnlyCueText() {
    let file = vtt::parse(SAMPLE_VTT, "sample.vtt").unwrap();

    assert_eq!(file.entries.len(), 2);
    assert_eq!(file.entries[0].id, 1);
    assert_eq!(file.entries[0].text, "This is a test subtitle.");
    assert_eq!(file.entries[1].id, 2);
    assert_eq!(file.entries[1].start_time_ms, 5000);
    assert_eq!(file.entries[1].text, "It contains\nmultiple entries.");
}

#[test]
fn test_vttParse_withoutHeader_shouldFail() {
    let result = vtt::parse("00:00:01.000 --> 00:00:02.000\nHi", "a.vtt");
    assert!(matches!(result, Err(SubtitleError::MissingHeader { .. })));

    let result = vtt::parse("WEBVTTX\n\n00:00:01.000 --> 00:00:02.000\nHi", "a.vtt");
    assert!(result.is_err());
}

#[test]
fn test_vttSerialize_shouldStartWithHeaderAndUseDots() {
    let file = SubtitleFile::new(
        "a.vtt",
        SubtitleFormat::Vtt,
        vec![SubtitleEntry::new(1, 3_723_004, 3_724_000, "Hi")],
    );
    assert_eq!(vtt::serialize(&file), "WEBVTT\n\n01:02:03.004 --> 01:02:04.000\nHi");
}

#[test]
fn test_assParse_withOverrideTags_shouldCleanText() {
    let file = ass::parse(SAMPLE_ASS, "sample.ass");

    assert_eq!(file.entries.len(), 2);
    assert_eq!(file.entries[1].text, "It contains\nmultiple entries, really.");
    assert_eq!(file.entries[1].start_time_ms, 5000);
    assert_eq!(file.metadata.get("ScriptType").map(String::as_str), Some("v4.00+"));
}

#[test]
fn test_assSplitDialogueFields_shouldIgnoreCommasInsideBraces() {
    let fields = ass::split_dialogue_fields("0,{\\pos(10,20)}Hi,there", 1);
    assert_eq!(fields, vec!["0", "{\\pos(10,20)}Hi,there"]);

    let fields = ass::split_dialogue_fields("a,{x,y},b,c", 9);
    assert_eq!(fields, vec!["a", "{x,y}", "b", "c"]);
}

#[test]
fn test_assTime_shouldTruncateToCentiseconds() {
    assert_eq!(ass::parse_time("1:02:03.45"), Some(3_723_450));
    assert_eq!(ass::format_time(3_723_459), "1:02:03.45");
    assert_eq!(ass::parse_time("garbage"), None);
}

#[test]
fn test_assSerialize_shouldEscapeNewlines() {
    let file = SubtitleFile::new(
        "a.ass",
        SubtitleFormat::Ass,
        vec![SubtitleEntry::new(1, 1000, 2000, "Top\nBottom")],
    );
    let output = ass::serialize(&file);

    assert!(output.starts_with("[Script Info]"));
    assert!(output.contains("[Events]\nFormat: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"));
    assert!(output.ends_with("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Top\\NBottom"));
}

#[test]
fn test_export_acrossFormats_shouldPreserveTimingAndText() {
    let source = subtitle::parse(SAMPLE_SRT, "sample.srt", None).unwrap();

    for format in SubtitleFormat::ALL {
        let exported = subtitle::export(&source, format);
        let name = format!("converted.{}", format.extension());
        let reparsed = subtitle::parse(&exported, &name, None).unwrap();

        assert_eq!(reparsed.format, format);
        assert_eq!(reparsed.entries.len(), source.entries.len());
        for (a, b) in source.entries.iter().zip(&reparsed.entries) {
            assert_eq!(a.start_time_ms, b.start_time_ms);
            assert_eq!(a.end_time_ms, b.end_time_ms);
            assert_eq!(a.text, b.text);
        }
    }
}

#[test]
fn test_parse_withUnknownContent_shouldReturnUnrecognizedFormat() {
    let result = subtitle::parse("just some prose", "notes.txt", None);
    assert!(matches!(result, Err(SubtitleError::UnrecognizedFormat)));
}

#[test]
fn test_parse_withExplicitFormat_shouldOverrideDetection() {
    let file = subtitle::parse(SAMPLE_SRT, "sample.vtt", Some(SubtitleFormat::Srt)).unwrap();
    assert_eq!(file.format, SubtitleFormat::Srt);
    assert_eq!(file.entries.len(), 3);
}
