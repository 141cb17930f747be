/*!
 * SubRip (SRT) parsing and serialization.
 *
 * Parsing is lenient: blocks that do not have an index line, a timecode
 * line and at least one text line are skipped instead of failing the file.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{SubtitleEntry, SubtitleFile, SubtitleFormat, split_ms, to_ms};

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2,}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @const: Blank-line block separator (lines holding only whitespace count as blank)
static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Parse SRT content into a subtitle file
pub fn parse(content: &str, name: &str) -> SubtitleFile {
    let normalized = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut entries = Vec::new();

    for block in BLOCK_SEPARATOR_REGEX.split(normalized.trim()) {
        match parse_block(block) {
            Some(entry) => entries.push(entry),
            None => {
                if !block.trim().is_empty() {
                    debug!("Skipping malformed SRT block: {:?}", block.lines().next().unwrap_or_default());
                }
            }
        }
    }

    SubtitleFile::new(name, SubtitleFormat::Srt, entries)
}

fn parse_block(block: &str) -> Option<SubtitleEntry> {
    let lines: Vec<&str> = block.trim().split('\n').collect();
    if lines.len() < 3 {
        return None;
    }

    let id: u32 = lines[0].trim().parse().ok()?;

    let caps = TIMESTAMP_REGEX.captures(lines[1])?;
    let start_ms = timestamp_from_captures(&caps, 1)?;
    let end_ms = timestamp_from_captures(&caps, 5)?;
    if end_ms < start_ms {
        return None;
    }

    let text = lines[2..].join("\n").trim().to_string();
    if text.is_empty() {
        return None;
    }

    Some(SubtitleEntry::new(id, start_ms, end_ms, text))
}

/// Parse timestamp groups starting at `start_idx` to milliseconds
fn timestamp_from_captures(caps: &regex::Captures, start_idx: usize) -> Option<u64> {
    let part = |offset: usize| -> Option<u64> { caps.get(start_idx + offset)?.as_str().parse().ok() };
    to_ms(part(0)?, part(1)?, part(2)?, part(3)?)
}

/// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
pub fn format_timestamp(ms: u64) -> String {
    let (hours, minutes, seconds, millis) = split_ms(ms);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Serialize entries back to SRT, writing the translation when present
pub fn serialize(file: &SubtitleFile) -> String {
    file.entries
        .iter()
        .map(|entry| {
            format!(
                "{}\n{} --> {}\n{}",
                entry.id,
                format_timestamp(entry.start_time_ms),
                format_timestamp(entry.end_time_ms),
                entry.output_text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
