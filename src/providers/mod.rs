/*!
 * Translation backends.
 *
 * The orchestrator only ever sees the [`Translator`] trait. Concrete
 * adapters live in submodules and are selected by [`LlmProvider`] tag:
 * - `openai`: OpenAI, custom OpenAI-compatible services and local servers
 * - `anthropic`: Anthropic Claude messages API
 * - `gemini`: Google Gemini generateContent API
 * - `mock`: scripted in-process translator for tests
 */

use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::translation::prompts::TranslationQuality;

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod openai;

/// A single line of text to translate, with optional surrounding dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source text
    pub text: String,
    /// Source language code or `auto`
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Neighboring lines rendered as `Previous: "..."` / `Next: "..."`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}

/// Outcome reported by a backend for one request.
///
/// An adapter may answer `Ok` with `error` set; the orchestrator treats that,
/// and an empty `translated_text`, the same as a failed call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationResponse {
    pub fn success(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            translated_text: text.into(),
            confidence: Some(confidence),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            translated_text: String::new(),
            confidence: None,
            error: Some(error.into()),
        }
    }

    /// Collapse into the translated text or a failure reason
    pub fn into_text(self) -> Result<String, String> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.translated_text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse.to_string());
        }
        Ok(self.translated_text)
    }
}

/// Capability every translation backend provides
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate one line of text
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ProviderError>;

    /// Whether credentials, model and endpoint are present. Never touches the network.
    fn is_configured(&self) -> bool;

    /// Live connectivity probe; `false` on any failure
    async fn validate_config(&self) -> bool;

    /// Human readable backend name used in logs and errors
    fn name(&self) -> String;
}

/// Backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    // @provider: OpenAI
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    // @provider: Anthropic Claude
    #[serde(rename = "claude")]
    Claude,
    // @provider: Google Gemini
    #[serde(rename = "gemini")]
    Gemini,
    // @provider: Third-party OpenAI-compatible service
    #[serde(rename = "custom-openai")]
    CustomOpenAI,
    // @provider: Local OpenAI-compatible server (Ollama, LM Studio)
    #[serde(rename = "local")]
    Local,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 5] = [Self::OpenAI, Self::Claude, Self::Gemini, Self::CustomOpenAI, Self::Local];

    // @returns: Lowercase provider identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::CustomOpenAI => "custom-openai",
            Self::Local => "local",
        }
    }

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Claude => "Claude",
            Self::Gemini => "Google Gemini",
            Self::CustomOpenAI => "Custom OpenAI-compatible",
            Self::Local => "Local model",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4.1-2025-04-14",
            Self::Claude => "claude-sonnet-4-20250514",
            Self::Gemini => "gemini-2.5-flash-preview-06-03",
            Self::CustomOpenAI => "deepseek-v3",
            Self::Local => "llama3.3:70b",
        }
    }

    /// Endpoint used when the configuration leaves `base_url` empty
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Claude => "https://api.anthropic.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::CustomOpenAI => "",
            Self::Local => "http://localhost:11434",
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Local)
    }

    pub fn requires_base_url(&self) -> bool {
        matches!(self, Self::CustomOpenAI | Self::Local)
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "claude" | "anthropic" => Ok(Self::Claude),
            "gemini" | "google" => Ok(Self::Gemini),
            "custom-openai" | "custom" => Ok(Self::CustomOpenAI),
            "local" | "ollama" | "lmstudio" => Ok(Self::Local),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    // @field: Backend family
    #[serde(default)]
    pub provider: LlmProvider,

    // @field: API key
    #[serde(default)]
    pub api_key: String,

    // @field: Model name
    #[serde(default)]
    pub model: String,

    // @field: Endpoint override; empty means the provider default
    #[serde(default)]
    pub base_url: String,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Output token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    // @field: Display name for custom and local backends
    #[serde(default)]
    pub custom_name: String,

    // @field: Request timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Defaults for a provider, with its default model filled in
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            api_key: String::new(),
            model: provider.default_model().to_string(),
            base_url: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            custom_name: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Configured endpoint, or the provider default, without a trailing slash
    pub fn effective_base_url(&self) -> String {
        let base = if self.base_url.trim().is_empty() {
            self.provider.default_base_url()
        } else {
            self.base_url.trim()
        };
        base.trim_end_matches('/').to_string()
    }

    /// Custom name when set, provider display name otherwise
    pub fn display_name(&self) -> String {
        if self.custom_name.trim().is_empty() {
            self.provider.display_name().to_string()
        } else {
            self.custom_name.trim().to_string()
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::new(LlmProvider::default())
    }
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    60
}

/// Build the adapter matching the configured provider
pub fn create_translator(config: &LlmConfig, quality: TranslationQuality) -> Arc<dyn Translator> {
    match config.provider {
        LlmProvider::OpenAI | LlmProvider::CustomOpenAI | LlmProvider::Local => {
            Arc::new(openai::OpenAI::new(config.clone(), quality))
        }
        LlmProvider::Claude => Arc::new(anthropic::Anthropic::new(config.clone(), quality)),
        LlmProvider::Gemini => Arc::new(gemini::Gemini::new(config.clone(), quality)),
    }
}

/// Shared HTTP client construction
pub(crate) fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs.max(1)))
        .build()
        .unwrap_or_default()
}

/// Pull the `error.message` field out of a JSON error body, falling back to the raw text
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Map a non-success HTTP status to the error taxonomy
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let message = api_error_message(body);
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(message),
        code => ProviderError::ApiError {
            status_code: code,
            message,
        },
    }
}

/// Map a transport failure to the error taxonomy
pub(crate) fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}
