/*!
 * Subtitle format engine.
 *
 * Parses SRT, WebVTT and ASS text into the canonical [`SubtitleFile`] model
 * and serializes it back to any of the three formats:
 *
 * - `model`: canonical entry and file types
 * - `detect`: format detection by extension or content
 * - `srt`, `vtt`, `ass`: per-format parser/serializer pairs
 */

pub mod ass;
pub mod detect;
pub mod model;
pub mod srt;
pub mod vtt;

use log::debug;

use crate::errors::SubtitleError;

pub use self::model::{SubtitleEntry, SubtitleFile, SubtitleFormat};

/// Parse subtitle text. When `format` is `None` it is detected from the file
/// name first and the content second; an unrecognized format is a hard error.
pub fn parse(content: &str, filename: &str, format: Option<SubtitleFormat>) -> Result<SubtitleFile, SubtitleError> {
    let format = format
        .or_else(|| detect::detect(filename, content))
        .ok_or(SubtitleError::UnrecognizedFormat)?;

    let file = match format {
        SubtitleFormat::Srt => srt::parse(content, filename),
        SubtitleFormat::Vtt => vtt::parse(content, filename)?,
        SubtitleFormat::Ass => ass::parse(content, filename),
    };

    debug!("Parsed {} entries from {} as {}", file.entries.len(), filename, format);
    Ok(file)
}

/// Serialize a subtitle file to the requested format
pub fn export(file: &SubtitleFile, format: SubtitleFormat) -> String {
    match format {
        SubtitleFormat::Srt => srt::serialize(file),
        SubtitleFormat::Vtt => vtt::serialize(file),
        SubtitleFormat::Ass => ass::serialize(file),
    }
}
