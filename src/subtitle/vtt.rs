/*!
 * WebVTT parsing and serialization.
 *
 * Unlike SRT, a missing `WEBVTT` header is a hard failure. Cue identifiers,
 * cue settings and `NOTE`/`STYLE`/`REGION` blocks are not carried over.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

use super::model::{SubtitleEntry, SubtitleFile, SubtitleFormat, split_ms, to_ms};

// @const: VTT cue timing line; the hour field is optional in WebVTT
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(\d{2,}):)?(\d{2}):(\d{2})\.(\d{3})\s*-->\s*(?:(\d{2,}):)?(\d{2}):(\d{2})\.(\d{3})").unwrap()
});

const HEADER: &str = "WEBVTT";

/// Block keywords whose lines never contribute cue text
const IGNORED_BLOCKS: [&str; 3] = ["NOTE", "STYLE", "REGION"];

/// Cue being accumulated
struct PendingCue {
    start_ms: u64,
    end_ms: u64,
    lines: Vec<String>,
}

/// Parse VTT content into a subtitle file
pub fn parse(content: &str, name: &str) -> Result<SubtitleFile, SubtitleError> {
    let normalized = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut lines = normalized.split('\n').map(str::trim).skip_while(|line| line.is_empty());

    match lines.next() {
        Some(header) if is_header(header) => {}
        _ => {
            return Err(SubtitleError::MissingHeader {
                format: SubtitleFormat::Vtt,
                expected: HEADER,
            });
        }
    }

    let mut entries = Vec::new();
    let mut pending: Option<PendingCue> = None;
    let mut next_id: u32 = 1;

    let mut flush = |cue: Option<PendingCue>, entries: &mut Vec<SubtitleEntry>| {
        if let Some(cue) = cue {
            if !cue.lines.is_empty() && cue.end_ms >= cue.start_ms {
                entries.push(SubtitleEntry::new(next_id, cue.start_ms, cue.end_ms, cue.lines.join("\n")));
                next_id += 1;
            }
        }
    };

    for line in lines {
        if line.is_empty() {
            flush(pending.take(), &mut entries);
            continue;
        }

        if let Some(caps) = TIMESTAMP_REGEX.captures(line) {
            // A timing line without a separating blank line closes the previous cue
            flush(pending.take(), &mut entries);
            // Out-of-range timings drop the cue along with its text lines
            pending = timestamp_from_captures(&caps, 1)
                .zip(timestamp_from_captures(&caps, 5))
                .map(|(start_ms, end_ms)| PendingCue {
                    start_ms,
                    end_ms,
                    lines: Vec::new(),
                });
            continue;
        }

        if IGNORED_BLOCKS.iter().any(|keyword| line.starts_with(keyword)) {
            continue;
        }

        if let Some(cue) = pending.as_mut() {
            cue.lines.push(line.to_string());
        }
    }
    flush(pending.take(), &mut entries);

    Ok(SubtitleFile::new(name, SubtitleFormat::Vtt, entries))
}

/// `WEBVTT` alone, or followed by whitespace and a free-form title
fn is_header(line: &str) -> bool {
    match line.strip_prefix(HEADER) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t']),
        None => false,
    }
}

/// Milliseconds from the groups at `start_idx`; an absent hour group counts as zero
fn timestamp_from_captures(caps: &regex::Captures, start_idx: usize) -> Option<u64> {
    let part = |offset: usize| -> Option<u64> {
        match caps.get(start_idx + offset) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    to_ms(part(0)?, part(1)?, part(2)?, part(3)?)
}

/// Format a timestamp in milliseconds to VTT format (HH:MM:SS.mmm)
pub fn format_timestamp(ms: u64) -> String {
    let (hours, minutes, seconds, millis) = split_ms(ms);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Serialize entries to VTT, writing the translation when present
pub fn serialize(file: &SubtitleFile) -> String {
    let body = file
        .entries
        .iter()
        .map(|entry| {
            format!(
                "{} --> {}\n{}",
                format_timestamp(entry.start_time_ms),
                format_timestamp(entry.end_time_ms),
                entry.output_text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}\n\n{}", HEADER, body)
}
