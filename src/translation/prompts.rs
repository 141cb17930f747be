/*!
 * Prompt construction shared by every HTTP adapter.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::providers::TranslationRequest;

/// System instruction sent ahead of every request
pub const SYSTEM_PROMPT: &str = "You are a professional subtitle translator. Translate subtitle lines accurately, \
keeping the tone and style of the original. Do not add explanations, notes or formatting.";

const PRECISE_SUFFIX: &str = "Take extra care with idioms, names and register; prefer an exact rendering over a loose paraphrase.";

/// Speed/accuracy trade-off selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationQuality {
    Fast,
    #[default]
    Standard,
    Precise,
}

impl TranslationQuality {
    /// Sampling temperature for this quality, `configured` being the user's value
    pub fn temperature(&self, configured: f32) -> f32 {
        match self {
            Self::Fast => 0.1,
            Self::Standard => configured,
            Self::Precise => 0.2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Standard => "standard",
            Self::Precise => "precise",
        }
    }
}

impl fmt::Display for TranslationQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationQuality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "standard" => Ok(Self::Standard),
            "precise" => Ok(Self::Precise),
            _ => Err(anyhow!("Invalid translation quality: {}", s)),
        }
    }
}

/// Render the user prompt for one request
pub fn build_prompt(request: &TranslationRequest, quality: TranslationQuality) -> String {
    let mut prompt = format!(
        "Translate the following {} subtitle text into {}, keeping its tone and style:\n\n\"{}\"",
        source_label(&request.source_language),
        request.target_language,
        request.text
    );

    if let Some(context) = request.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str("\n\nContext:\n");
        prompt.push_str(context);
    }

    prompt.push_str("\n\nReturn only the translation, without quotes, comments or explanations.");

    if quality == TranslationQuality::Precise {
        prompt.push(' ');
        prompt.push_str(PRECISE_SUFFIX);
    }

    prompt
}

fn source_label(code: &str) -> &str {
    if code.eq_ignore_ascii_case("auto") {
        "source-language"
    } else {
        code
    }
}
