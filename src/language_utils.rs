/*!
 * Language utilities for subtitle translation.
 *
 * Holds the table of languages offered for translation, a script-based
 * language guess for subtitle text, and ISO 639 code handling for codes
 * outside the table.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// A language offered for translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// Code sent to the translation backend (`en`, `zh-CN`)
    pub code: &'static str,
    /// English name
    pub name: &'static str,
    /// Name in the language itself
    pub native_name: &'static str,
}

const fn lang(code: &'static str, name: &'static str, native_name: &'static str) -> LanguageInfo {
    LanguageInfo {
        code,
        name,
        native_name,
    }
}

// @const: Languages offered for translation
pub const SUPPORTED_LANGUAGES: [LanguageInfo; 22] = [
    lang("zh-CN", "Chinese (Simplified)", "中文（简体）"),
    lang("zh-TW", "Chinese (Traditional)", "中文（繁體）"),
    lang("en", "English", "English"),
    lang("ja", "Japanese", "日本語"),
    lang("ko", "Korean", "한국어"),
    lang("fr", "French", "Français"),
    lang("de", "German", "Deutsch"),
    lang("es", "Spanish", "Español"),
    lang("it", "Italian", "Italiano"),
    lang("pt", "Portuguese", "Português"),
    lang("ru", "Russian", "Русский"),
    lang("ar", "Arabic", "العربية"),
    lang("hi", "Hindi", "हिन्दी"),
    lang("th", "Thai", "ไทย"),
    lang("vi", "Vietnamese", "Tiếng Việt"),
    lang("tr", "Turkish", "Türkçe"),
    lang("pl", "Polish", "Polski"),
    lang("nl", "Dutch", "Nederlands"),
    lang("sv", "Swedish", "Svenska"),
    lang("da", "Danish", "Dansk"),
    lang("no", "Norwegian", "Norsk"),
    lang("fi", "Finnish", "Suomi"),
];

// @const: Codes shown first in pickers
const POPULAR_CODES: [&str; 7] = ["zh-CN", "en", "ja", "ko", "fr", "de", "es"];

// @const: Characters that only appear in Traditional Chinese text
const TRADITIONAL_MARKERS: [char; 8] = ['繁', '體', '傳', '統', '華', '語', '臺', '灣'];

/// Characters of text examined by `detect_language`
const DETECTION_SAMPLE_CHARS: usize = 200;

/// Look up a table entry by exact code
pub fn get_language_by_code(code: &str) -> Option<&'static LanguageInfo> {
    SUPPORTED_LANGUAGES.iter().find(|lang| lang.code == code)
}

/// `English name (native name)` for table codes, the code itself otherwise
pub fn get_language_display_name(code: &str) -> String {
    match get_language_by_code(code) {
        Some(lang) => format!("{} ({})", lang.name, lang.native_name),
        None => code.to_string(),
    }
}

pub fn is_language_supported(code: &str) -> bool {
    get_language_by_code(code).is_some()
}

pub fn get_popular_languages() -> Vec<&'static LanguageInfo> {
    SUPPORTED_LANGUAGES
        .iter()
        .filter(|lang| POPULAR_CODES.contains(&lang.code))
        .collect()
}

/// Case-insensitive substring search over code and both names
pub fn search_languages(query: &str) -> Vec<&'static LanguageInfo> {
    let query = query.trim().to_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .filter(|lang| {
            lang.code.to_lowercase().contains(&query)
                || lang.name.to_lowercase().contains(&query)
                || lang.native_name.to_lowercase().contains(&query)
        })
        .collect()
}

/// Guess the language of `text` from the scripts in its first 200 characters.
///
/// Kana is checked before Han ideographs since Japanese text mixes both.
/// Latin-script text cannot be told apart and falls back to `en`.
pub fn detect_language(text: &str) -> &'static str {
    let sample: Vec<char> = text.chars().take(DETECTION_SAMPLE_CHARS).collect();
    let has = |range: std::ops::RangeInclusive<char>| sample.iter().any(|c| range.contains(c));

    if has('\u{3040}'..='\u{30ff}') {
        return "ja";
    }
    if has('\u{4e00}'..='\u{9fff}') {
        if sample.iter().any(|c| TRADITIONAL_MARKERS.contains(c)) {
            return "zh-TW";
        }
        return "zh-CN";
    }
    if has('\u{ac00}'..='\u{d7af}') {
        return "ko";
    }
    if has('\u{0600}'..='\u{06ff}') {
        return "ar";
    }
    if has('\u{0400}'..='\u{04ff}') {
        return "ru";
    }
    if has('\u{0e00}'..='\u{0e7f}') {
        return "th";
    }
    "en"
}

/// Normalize a language code to ISO 639-3 (3-letter) format.
///
/// Region suffixes (`zh-CN`, `pt_BR`) are ignored and ISO 639-2/B codes
/// are mapped to their terminology form.
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let base = code.trim().split(['-', '_']).next().unwrap_or_default().to_lowercase();

    let lang = match base.len() {
        2 => Language::from_639_1(&base),
        3 => Language::from_639_3(&bibliographic_to_terminology(&base)),
        _ => None,
    };

    lang.map(|lang| lang.to_639_3().to_string())
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

fn bibliographic_to_terminology(code: &str) -> String {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "per" => "fas",
        "rum" => "ron",
        "slo" => "slk",
        other => other,
    }
    .to_string()
}

/// Check if two language codes represent the same language, ignoring region
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// English name for a code: the table name when listed, ISO 639 otherwise
pub fn get_language_name(code: &str) -> Result<String> {
    if let Some(lang) = get_language_by_code(code) {
        return Ok(lang.name.to_string());
    }

    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
