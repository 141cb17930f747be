/*!
 * Advanced SubStation Alpha (ASS/SSA) parsing and serialization.
 *
 * Only the `[Events]` section is interpreted. `[Script Info]` key/value
 * pairs are kept as file metadata; styles are not. Export writes a fixed
 * minimal header, so styling and positioning do not survive a round trip.
 */

use std::collections::HashMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{SubtitleEntry, SubtitleFile, SubtitleFormat, to_ms};

// @const: ASS time (H:MM:SS.CC)
static TIME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+):(\d{2}):(\d{2})\.(\d{2})").unwrap());

// @const: Override tag block such as {\an8} or {\i1}
static OVERRIDE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

/// Event fields assumed when no `Format:` line has been seen
const DEFAULT_EVENT_FIELDS: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV", "Effect", "Text",
];

const EXPORT_HEADER: &str = "[Script Info]
Title: Translated Subtitle
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Arial,20,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,2,0,2,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ScriptInfo,
    Events,
    Other,
}

/// Parse ASS content into a subtitle file
pub fn parse(content: &str, name: &str) -> SubtitleFile {
    let normalized = content.trim_start_matches('\u{feff}');
    let mut entries = Vec::new();
    let mut metadata = Vec::new();
    let mut section = Section::Other;
    let mut format_fields: Vec<String> = Vec::new();
    let mut next_id: u32 = 1;

    for line in normalized.lines() {
        let line = line.trim();

        if line.starts_with('[') && line.ends_with(']') {
            section = match line {
                "[Events]" => Section::Events,
                "[Script Info]" => Section::ScriptInfo,
                _ => Section::Other,
            };
            continue;
        }

        match section {
            Section::ScriptInfo => {
                if line.starts_with(';') {
                    continue;
                }
                if let Some((key, value)) = line.split_once(':') {
                    metadata.push((key.trim().to_string(), value.trim().to_string()));
                }
            }
            Section::Events => {
                if let Some(format) = line.strip_prefix("Format:") {
                    format_fields = format.split(',').map(|field| field.trim().to_string()).collect();
                } else if let Some(dialogue) = line.strip_prefix("Dialogue:") {
                    match parse_dialogue(dialogue.trim(), &format_fields, next_id) {
                        Some(entry) => {
                            entries.push(entry);
                            next_id += 1;
                        }
                        None => debug!("Skipping unusable ASS dialogue line: {}", line),
                    }
                }
            }
            Section::Other => {}
        }
    }

    let mut file = SubtitleFile::new(name, SubtitleFormat::Ass, entries);
    file.metadata.extend(metadata);
    file
}

fn parse_dialogue(data: &str, format_fields: &[String], id: u32) -> Option<SubtitleEntry> {
    let fields: Vec<&str> = if format_fields.is_empty() {
        DEFAULT_EVENT_FIELDS.to_vec()
    } else {
        format_fields.iter().map(String::as_str).collect()
    };
    let values = split_dialogue_fields(data, fields.len().saturating_sub(1));
    if values.len() < fields.len() {
        return None;
    }

    let field_map: HashMap<&str, &str> = fields.into_iter().zip(values.iter().map(String::as_str)).collect();

    let start_ms = parse_time(field_map.get("Start")?)?;
    let end_ms = parse_time(field_map.get("End")?)?;
    let text = clean_text(field_map.get("Text")?);

    if text.is_empty() || end_ms < start_ms {
        return None;
    }

    Some(SubtitleEntry::new(id, start_ms, end_ms, text))
}

/// Split a dialogue payload on commas outside `{...}` blocks, stopping after
/// `max_splits` delimiters so the trailing text field keeps its own commas.
pub fn split_dialogue_fields(data: &str, max_splits: usize) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut brace_depth: usize = 0;

    for ch in data.chars() {
        match ch {
            '{' => brace_depth += 1,
            '}' => brace_depth = brace_depth.saturating_sub(1),
            _ => {}
        }

        if ch == ',' && brace_depth == 0 && fields.len() < max_splits {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Parse `H:MM:SS.CC` to milliseconds
pub fn parse_time(value: &str) -> Option<u64> {
    let caps = TIME_REGEX.captures(value)?;
    let part = |idx: usize| -> Option<u64> { caps.get(idx)?.as_str().parse().ok() };
    to_ms(part(1)?, part(2)?, part(3)?, part(4)? * 10)
}

/// Strip override tags and decode the `\N`, `\n` and `\h` escapes
pub fn clean_text(text: &str) -> String {
    OVERRIDE_TAG_REGEX
        .replace_all(text, "")
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
        .trim()
        .to_string()
}

/// Format milliseconds as `H:MM:SS.CC`, truncating to centiseconds
pub fn format_time(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let centis = (ms % 1_000) / 10;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
}

/// Serialize entries under a fixed header with one `Default` style
pub fn serialize(file: &SubtitleFile) -> String {
    let dialogues = file
        .entries
        .iter()
        .map(|entry| {
            format!(
                "Dialogue: 0,{},{},Default,,0,0,0,,{}",
                format_time(entry.start_time_ms),
                format_time(entry.end_time_ms),
                entry.output_text().replace('\n', "\\N")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}{}", EXPORT_HEADER, dialogues)
}
