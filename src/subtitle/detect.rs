/*!
 * Subtitle format detection by file name or by content sniffing.
 */

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::SubtitleFormat;

// @const: An SRT index line directly followed by a timecode line
static SRT_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+[ \t]*\n\d{2,}:\d{2}:\d{2},\d{3}\s*-->\s*\d{2,}:\d{2}:\d{2},\d{3}").unwrap()
});

/// Detect the format from the file extension (`.srt`, `.vtt`, `.ass`, `.ssa`)
pub fn detect_by_name(filename: &str) -> Option<SubtitleFormat> {
    let extension = Path::new(filename).extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "srt" => Some(SubtitleFormat::Srt),
        "vtt" => Some(SubtitleFormat::Vtt),
        "ass" | "ssa" => Some(SubtitleFormat::Ass),
        _ => None,
    }
}

/// Detect the format from a content sample. The first matching heuristic wins.
pub fn detect_by_content(content: &str) -> Option<SubtitleFormat> {
    let trimmed = content.trim_start_matches('\u{feff}').trim();

    if trimmed.starts_with("WEBVTT") {
        return Some(SubtitleFormat::Vtt);
    }

    if trimmed.contains("[Script Info]") || trimmed.contains("[V4+ Styles]") {
        return Some(SubtitleFormat::Ass);
    }

    let normalized = trimmed.replace("\r\n", "\n");
    if SRT_BLOCK_REGEX.is_match(&normalized) {
        return Some(SubtitleFormat::Srt);
    }

    None
}

/// Name lookup first, content sniffing second
pub fn detect(filename: &str, content: &str) -> Option<SubtitleFormat> {
    detect_by_name(filename).or_else(|| detect_by_content(content))
}
