/*!
 * Context window and preview helpers.
 */

use crate::subtitle::SubtitleEntry;

/// Characters kept in a progress preview before truncation
pub const PREVIEW_CHARS: usize = 50;

/// Render the neighbors of `entries[index]` as translation context.
///
/// Uses the neighbors' original text; a missing neighbor is omitted and
/// `None` is returned when there is nothing to add.
pub fn build_context(entries: &[SubtitleEntry], index: usize) -> Option<String> {
    let mut parts = Vec::with_capacity(2);

    if let Some(previous) = index.checked_sub(1).and_then(|i| entries.get(i)) {
        parts.push(format!("Previous: \"{}\"", previous.original_text));
    }
    if let Some(next) = entries.get(index + 1) {
        parts.push(format!("Next: \"{}\"", next.original_text));
    }

    if parts.is_empty() { None } else { Some(parts.join("\n")) }
}

/// First `PREVIEW_CHARS` characters, with `...` when truncated
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
