/*!
 * Tests for the HTTP provider adapters against a local stub server
 */

use std::sync::Arc;

use axum::http::Method;
use serde_json::json;

use subtitle_translator::errors::ProviderError;
use subtitle_translator::providers::anthropic::Anthropic;
use subtitle_translator::providers::gemini::Gemini;
use subtitle_translator::providers::openai::OpenAI;
use subtitle_translator::providers::{LlmConfig, LlmProvider, TranslationRequest, Translator, create_translator};
use subtitle_translator::translation::{ConcurrencySettings, TranslationOrchestrator, TranslationQuality};

use crate::common::numbered_file;
use crate::common::stub_server::StubServer;

const CHAT_PATH: &str = "/v1/chat/completions";

fn config(provider: LlmProvider, base_url: String) -> LlmConfig {
    LlmConfig {
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        base_url,
        ..LlmConfig::new(provider)
    }
}

fn request() -> TranslationRequest {
    TranslationRequest::new("Hello", "en", "fr")
}

fn chat_reply(content: &str, finish_reason: &str) -> serde_json::Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content }, "finish_reason": finish_reason }]
    })
}

#[tokio::test]
async fn test_openAI_translate_shouldSendBearerAndReadFirstChoice() {
    let server = StubServer::start().await;
    server.respond_json(Method::POST, CHAT_PATH, 200, chat_reply(" Bonjour \n", "stop"));

    let translator = OpenAI::new(
        config(LlmProvider::OpenAI, format!("{}/v1", server.base_url())),
        TranslationQuality::Standard,
    );
    let response = translator.translate(&request()).await.unwrap();

    assert_eq!(response.translated_text, "Bonjour");
    assert_eq!(response.confidence, Some(0.9));

    let sent = &server.requests()[0];
    assert_eq!(sent.path, CHAT_PATH);
    assert_eq!(sent.header("authorization"), Some("Bearer test-key"));
    assert!(sent.body.contains("\"model\":\"test-model\""));
    assert!(sent.body.contains("\"stream\":false"));
    assert!(sent.body.contains("\\\"Hello\\\""));
}

#[tokio::test]
async fn test_openAI_translate_withUnauthorized_shouldReturnAuthenticationError() {
    let server = StubServer::start().await;
    server.respond_json(
        Method::POST,
        CHAT_PATH,
        401,
        json!({ "error": { "message": "Incorrect API key" } }),
    );

    let translator = OpenAI::new(
        config(LlmProvider::CustomOpenAI, server.base_url()),
        TranslationQuality::Standard,
    );
    let error = translator.translate(&request()).await.unwrap_err();

    assert!(matches!(error, ProviderError::AuthenticationError(message) if message == "Incorrect API key"));
}

#[tokio::test]
async fn test_openAI_translate_withServerError_shouldReturnApiError() {
    let server = StubServer::start().await;
    server.respond_text(Method::POST, CHAT_PATH, 500, "upstream exploded");

    let translator = OpenAI::new(
        config(LlmProvider::CustomOpenAI, server.base_url()),
        TranslationQuality::Standard,
    );
    let error = translator.translate(&request()).await.unwrap_err();

    assert!(matches!(error, ProviderError::ApiError { status_code: 500, ref message } if message == "upstream exploded"));
}

#[tokio::test]
async fn test_openAI_translate_withNoChoices_shouldReturnEmptyResponse() {
    let server = StubServer::start().await;
    server.respond_json(Method::POST, CHAT_PATH, 200, json!({ "choices": [] }));

    let translator = OpenAI::new(
        config(LlmProvider::CustomOpenAI, format!("{}{}", server.base_url(), CHAT_PATH)),
        TranslationQuality::Standard,
    );
    let error = translator.translate(&request()).await.unwrap_err();

    assert!(matches!(error, ProviderError::EmptyResponse));
}

#[tokio::test]
async fn test_local_validateConfig_withoutModelsEndpoint_shouldFallBackToChat() {
    let server = StubServer::start().await;
    server.respond_json(Method::POST, CHAT_PATH, 200, chat_reply("Hi", "stop"));

    let mut local = config(LlmProvider::Local, server.base_url());
    local.api_key.clear();
    let translator = OpenAI::new(local, TranslationQuality::Standard);

    assert!(translator.validate_config().await);
    assert_eq!(server.hits(Method::GET, "/v1/models"), 1);
    assert_eq!(server.hits(Method::POST, CHAT_PATH), 1);
    assert!(server.requests().iter().all(|sent| sent.header("authorization").is_none()));
}

#[tokio::test]
async fn test_openAI_validateConfig_withModelsEndpoint_shouldNotSendChat() {
    let server = StubServer::start().await;
    server.respond_json(Method::GET, "/v1/models", 200, json!({ "data": [] }));

    let translator = OpenAI::new(
        config(LlmProvider::OpenAI, format!("{}/v1", server.base_url())),
        TranslationQuality::Standard,
    );

    assert!(translator.validate_config().await);
    assert_eq!(server.hits(Method::POST, CHAT_PATH), 0);
}

#[tokio::test]
async fn test_local_translate_shouldReportLocalConfidence() {
    let server = StubServer::start().await;
    server.respond_json(Method::POST, CHAT_PATH, 200, chat_reply("Salut", "stop"));

    let translator = OpenAI::new(config(LlmProvider::Local, server.base_url()), TranslationQuality::Fast);
    let response = translator.translate(&request()).await.unwrap();

    assert_eq!(response.confidence, Some(0.8));
}

#[tokio::test]
async fn test_anthropic_translate_shouldSendVersionHeaders() {
    let server = StubServer::start().await;
    server.respond_json(
        Method::POST,
        "/v1/messages",
        200,
        json!({ "content": [{ "type": "text", "text": "Bonjour" }] }),
    );

    let translator = Anthropic::new(config(LlmProvider::Claude, server.base_url()), TranslationQuality::Precise);
    let response = translator.translate(&request()).await.unwrap();

    assert_eq!(response.translated_text, "Bonjour");
    assert_eq!(response.confidence, Some(0.9));

    let sent = &server.requests()[0];
    assert_eq!(sent.header("x-api-key"), Some("test-key"));
    assert_eq!(sent.header("anthropic-version"), Some("2023-06-01"));
    assert!(sent.body.contains("\"system\":"));
}

#[tokio::test]
async fn test_gemini_translate_shouldPassKeyAsQueryParameter() {
    let server = StubServer::start().await;
    let path = "/v1beta/models/test-model:generateContent";
    server.respond_json(
        Method::POST,
        path,
        200,
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Bonjour" }] },
                "finishReason": "MAX_TOKENS"
            }]
        }),
    );

    let translator = Gemini::new(config(LlmProvider::Gemini, server.base_url()), TranslationQuality::Standard);
    let response = translator.translate(&request()).await.unwrap();

    assert_eq!(response.translated_text, "Bonjour");
    assert_eq!(response.confidence, Some(0.8));

    let sent = &server.requests()[0];
    assert_eq!(sent.path, path);
    assert_eq!(sent.query.as_deref(), Some("key=test-key"));
    assert!(sent.body.contains("\"generationConfig\""));
}

#[tokio::test]
async fn test_gemini_translate_withNoCandidates_shouldReturnEmptyResponse() {
    let server = StubServer::start().await;
    server.respond_json(
        Method::POST,
        "/v1beta/models/test-model:generateContent",
        200,
        json!({ "candidates": [] }),
    );

    let translator = Gemini::new(config(LlmProvider::Gemini, server.base_url()), TranslationQuality::Standard);
    assert!(matches!(
        translator.translate(&request()).await,
        Err(ProviderError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_unconfiguredAdapters_shouldNotCallTheNetwork() {
    let server = StubServer::start().await;

    for provider in LlmProvider::ALL {
        let mut cfg = LlmConfig::new(provider);
        cfg.base_url = server.base_url();
        cfg.model.clear();
        let translator = create_translator(&cfg, TranslationQuality::Standard);

        assert!(!translator.is_configured());
        assert!(!translator.validate_config().await);
        assert!(matches!(
            translator.translate(&request()).await,
            Err(ProviderError::NotConfigured(_))
        ));
    }

    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_orchestrator_withHttpAdapter_shouldTranslateFile() {
    let server = StubServer::start().await;
    server.respond_json(Method::POST, CHAT_PATH, 200, chat_reply("traduit", "stop"));

    let translator = create_translator(
        &config(LlmProvider::CustomOpenAI, server.base_url()),
        TranslationQuality::Standard,
    );
    let orchestrator = TranslationOrchestrator::new(Arc::clone(&translator), ConcurrencySettings::custom(2, 3, 0));

    let file = orchestrator.translate_file(numbered_file(5), "en", "fr").await.unwrap();

    assert_eq!(server.hits(Method::POST, CHAT_PATH), 5);
    assert!(file.entries.iter().all(|e| e.translated_text.as_deref() == Some("traduit")));
}
