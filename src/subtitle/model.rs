/*!
 * Canonical subtitle model shared by every parser and serializer.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip
    Srt,
    /// WebVTT
    Vtt,
    /// Advanced SubStation Alpha (also covers .ssa input)
    Ass,
}

impl SubtitleFormat {
    /// All formats, in detection order for content sniffing
    pub const ALL: [SubtitleFormat; 3] = [Self::Vtt, Self::Ass, Self::Srt];

    /// Canonical file extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
            Self::Ass => "ass",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Srt => "SRT",
            Self::Vtt => "VTT",
            Self::Ass => "ASS",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for SubtitleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "ass" | "ssa" => Ok(Self::Ass),
            _ => Err(anyhow!("Invalid subtitle format: {}", s)),
        }
    }
}

// @struct: Single timed subtitle line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    // @field: Ordering key within one parse, used to correlate results
    pub id: u32,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms, never before start
    pub end_time_ms: u64,

    // @field: Current display text
    pub text: String,

    // @field: Text as parsed, never modified afterwards
    pub original_text: String,

    // @field: Present once translation produced something for this entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
}

impl SubtitleEntry {
    /// Create an untranslated entry; `original_text` starts as a copy of `text`
    pub fn new(id: u32, start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id,
            start_time_ms,
            end_time_ms,
            original_text: text.clone(),
            text,
            translated_text: None,
        }
    }

    /// Text a serializer should write: the translation when present, the source otherwise
    pub fn output_text(&self) -> &str {
        self.translated_text.as_deref().unwrap_or(&self.text)
    }

    /// Duration of the entry in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }
}

/// A parsed subtitle document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleFile {
    /// Source file name
    pub name: String,

    /// Format the file was parsed from
    pub format: SubtitleFormat,

    /// Entries sorted by start time
    pub entries: Vec<SubtitleEntry>,

    /// Format specific key/value data; targets that cannot represent it drop it
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl SubtitleFile {
    /// Create a file from entries, enforcing start-time ordering
    pub fn new(name: impl Into<String>, format: SubtitleFormat, entries: Vec<SubtitleEntry>) -> Self {
        let mut file = Self {
            name: name.into(),
            format,
            entries,
            metadata: BTreeMap::new(),
        };
        file.sort_entries();
        file
    }

    /// Stable sort by start time; ids are left untouched
    pub fn sort_entries(&mut self) {
        self.entries.sort_by_key(|entry| entry.start_time_ms);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that carry a translation
    pub fn translated_count(&self) -> usize {
        self.entries.iter().filter(|e| e.translated_text.is_some()).count()
    }
}

impl fmt::Display for SubtitleFile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle File")?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

/// Split milliseconds into (hours, minutes, seconds, millis)
pub(crate) fn split_ms(ms: u64) -> (u64, u64, u64, u64) {
    (
        ms / 3_600_000,
        (ms % 3_600_000) / 60_000,
        (ms % 60_000) / 1_000,
        ms % 1_000,
    )
}

/// Total milliseconds from time components, `None` when the sum overflows
pub(crate) fn to_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes.checked_mul(60_000)?)?
        .checked_add(seconds.checked_mul(1_000)?)?
        .checked_add(millis)
}
