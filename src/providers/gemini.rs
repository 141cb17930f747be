/*!
 * Google Gemini `generateContent` adapter.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{
    LlmConfig, TranslationRequest, TranslationResponse, Translator, http_client, status_error, transport_error,
};
use crate::translation::prompts::{SYSTEM_PROMPT, TranslationQuality, build_prompt};

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
pub struct SafetyRating {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub probability: String,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl Candidate {
    fn first_text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .first()
            .map(|part| part.text.trim())
            .filter(|text| !text.is_empty())
    }

    /// Confidence from the finish reason and safety ratings
    pub fn confidence(&self) -> f32 {
        match self.finish_reason.as_deref() {
            Some("STOP") => {
                let risky = self
                    .safety_ratings
                    .iter()
                    .any(|rating| rating.probability == "HIGH" || rating.probability == "MEDIUM");
                if risky { 0.7 } else { 0.9 }
            }
            Some("MAX_TOKENS") => 0.8,
            _ => 0.6,
        }
    }
}

/// Gemini translator
#[derive(Debug)]
pub struct Gemini {
    client: Client,
    config: LlmConfig,
    quality: TranslationQuality,
}

impl Gemini {
    pub fn new(config: LlmConfig, quality: TranslationQuality) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config,
            quality,
        }
    }

    /// Endpoint without the key query parameter
    pub fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.effective_base_url(),
            self.config.model
        )
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error ({}): {}", status, body);
            return Err(status_error(status, &body));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    fn translation_request(&self, prompt: String) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content::text(prompt)],
            system_instruction: Some(Content::text(SYSTEM_PROMPT)),
            generation_config: GenerationConfig {
                temperature: Some(self.quality.temperature(self.config.temperature)),
                max_output_tokens: self.config.max_tokens,
                top_p: Some(0.8),
                top_k: Some(10),
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_MEDIUM_AND_ABOVE",
                })
                .collect(),
        }
    }
}

#[async_trait]
impl Translator for Gemini {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(self.name()));
        }

        let response = self
            .generate(&self.translation_request(build_prompt(request, self.quality)))
            .await?;

        let candidate = response.candidates.first().ok_or(ProviderError::EmptyResponse)?;
        let text = candidate.first_text().ok_or(ProviderError::EmptyResponse)?;

        debug!("Gemini translated {} chars", request.text.len());
        Ok(TranslationResponse::success(text, candidate.confidence()))
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty() && !self.config.model.trim().is_empty()
    }

    async fn validate_config(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        let probe = GenerateRequest {
            contents: vec![Content::text("Hello")],
            system_instruction: None,
            generation_config: GenerationConfig {
                temperature: None,
                max_output_tokens: 10,
                top_p: None,
                top_k: None,
            },
            safety_settings: Vec::new(),
        };
        self.generate(&probe).await.is_ok()
    }

    fn name(&self) -> String {
        self.config.display_name()
    }
}
