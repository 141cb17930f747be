/*!
 * OpenAI chat-completions adapter.
 *
 * One client serves three configurations that speak the same protocol:
 * the OpenAI API itself, third-party OpenAI-compatible services, and local
 * servers such as Ollama or LM Studio where the API key is optional.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{
    LlmConfig, LlmProvider, TranslationRequest, TranslationResponse, Translator, http_client, status_error,
    transport_error,
};
use crate::translation::prompts::{SYSTEM_PROMPT, TranslationQuality, build_prompt};

/// Chat completions request body
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens,
            stream: false,
        }
    }

    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// OpenAI-compatible translator
#[derive(Debug)]
pub struct OpenAI {
    client: Client,
    config: LlmConfig,
    quality: TranslationQuality,
}

impl OpenAI {
    pub fn new(config: LlmConfig, quality: TranslationQuality) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config,
            quality,
        }
    }

    /// Root the `/chat/completions` and `/models` paths hang off.
    ///
    /// OpenAI's base already ends in `/v1`. For custom and local servers a
    /// full `/chat/completions` URL is accepted and `/v1` is appended when
    /// missing.
    pub fn api_root(&self) -> String {
        let base = self.config.effective_base_url();
        if self.config.provider == LlmProvider::OpenAI {
            return base;
        }
        if let Some(root) = base.strip_suffix("/chat/completions") {
            return root.to_string();
        }
        if base.ends_with("/v1") {
            base
        } else {
            format!("{}/v1", base)
        }
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.api_root())
    }

    pub fn models_url(&self) -> String {
        format!("{}/models", self.api_root())
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        if self.config.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&self.config.api_key)
        }
    }

    /// Send a chat request and return the first choice
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatChoice, ProviderError> {
        let response = self
            .authorize(self.client.post(self.chat_url()))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} API error ({}): {}", self.config.display_name(), status, body);
            return Err(status_error(status, &body));
        }

        let chat = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        chat.choices.into_iter().next().ok_or(ProviderError::EmptyResponse)
    }

    /// Fixed for OpenAI and local servers; derived from the finish reason for custom services
    fn confidence(&self, finish_reason: Option<&str>) -> f32 {
        match self.config.provider {
            LlmProvider::Local => 0.8,
            LlmProvider::CustomOpenAI => match finish_reason {
                Some("stop") => 0.9,
                Some("length") => 0.8,
                Some("content_filter") => 0.6,
                _ => 0.7,
            },
            _ => 0.9,
        }
    }

    async fn probe_chat(&self) -> bool {
        let request = ChatRequest::new(&self.config.model, 5).add_message("user", "Hello");
        self.complete(&request).await.is_ok()
    }
}

#[async_trait]
impl Translator for OpenAI {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured(self.name()));
        }

        let chat = ChatRequest::new(&self.config.model, self.config.max_tokens)
            .add_message("system", SYSTEM_PROMPT)
            .add_message("user", build_prompt(request, self.quality))
            .temperature(self.quality.temperature(self.config.temperature));

        let choice = self.complete(&chat).await?;
        let text = choice.message.content.trim();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        debug!("{} translated {} chars", self.name(), request.text.len());
        Ok(TranslationResponse::success(text, self.confidence(choice.finish_reason.as_deref())))
    }

    fn is_configured(&self) -> bool {
        let has_model = !self.config.model.trim().is_empty();
        let has_key = !self.config.api_key.trim().is_empty();
        let has_base = !self.config.effective_base_url().is_empty();

        match self.config.provider {
            LlmProvider::CustomOpenAI => has_base && has_key && has_model,
            LlmProvider::Local => has_base && has_model,
            _ => has_key && has_model,
        }
    }

    async fn validate_config(&self) -> bool {
        if !self.is_configured() {
            return false;
        }

        let models = self.authorize(self.client.get(self.models_url())).send().await;
        match models {
            Ok(response) if response.status().is_success() => true,
            // Many compatible servers lack /models; fall back to a tiny chat request
            _ if self.config.provider != LlmProvider::OpenAI => self.probe_chat().await,
            _ => false,
        }
    }

    fn name(&self) -> String {
        self.config.display_name()
    }
}
