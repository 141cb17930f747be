/*!
 * Tests for loading, saving and validating the JSON configuration
 */

use anyhow::Result;

use subtitle_translator::app_config::{Config, LogLevel};
use subtitle_translator::providers::LlmProvider;
use subtitle_translator::subtitle::SubtitleFormat;
use subtitle_translator::translation::{ConcurrencyMode, TranslationQuality};

use crate::common;

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config, Config::default());
    assert_eq!(Config::load(&path)?, config);
    Ok(())
}

#[test]
fn test_save_thenLoad_shouldPreserveEveryField() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("custom.json");

    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "ja".to_string();
    config.set_provider(LlmProvider::Claude);
    config.llm.api_key = "key".to_string();
    config.quality = TranslationQuality::Precise;
    config.output_format = Some(SubtitleFormat::Vtt);
    config.log_level = LogLevel::Debug;
    config.apply_concurrency_mode(ConcurrencyMode::High);
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded, config);
    assert_eq!(loaded.llm.model, LlmProvider::Claude.default_model());
    assert_eq!(loaded.concurrency.max_concurrent, 6);
    Ok(())
}

#[test]
fn test_load_withJsonTags_shouldReadOriginalNames() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "target_language": "ko",
            "llm": { "provider": "custom-openai", "base_url": "https://llm.example.com/v1", "api_key": "k" },
            "concurrency": { "max_concurrent": 4, "batch_size": 2, "delay_between_requests_ms": 0, "mode": "custom" },
            "quality": "fast",
            "output_format": "ass",
            "log_level": "warn"
        }"#,
    )?;

    let config = Config::load(&path)?;

    assert_eq!(config.llm.provider, LlmProvider::CustomOpenAI);
    assert_eq!(config.llm.model, "deepseek-v3");
    assert_eq!(config.concurrency.mode, ConcurrencyMode::Custom);
    assert_eq!(config.quality, TranslationQuality::Fast);
    assert_eq!(config.output_format, Some(SubtitleFormat::Ass));
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_load_withMalformedJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load(&path).is_err());
    Ok(())
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.llm.api_key = "key".to_string();
    config.concurrency.max_concurrent = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withOutOfRangeTemperature_shouldFail() {
    let mut config = Config::default();
    config.llm.api_key = "key".to_string();
    config.llm.temperature = 2.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withIsoCodeOutsideTable_shouldPass() {
    let mut config = Config::default();
    config.llm.api_key = "key".to_string();
    config.source_language = "uk".to_string();
    config.target_language = "pt-BR".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_setProvider_withCustomModel_shouldKeepModel() {
    let mut config = Config::default();
    config.llm.model = "gpt-4o-mini".to_string();
    config.set_provider(LlmProvider::CustomOpenAI);
    assert_eq!(config.llm.model, "gpt-4o-mini");

    let mut config = Config::default();
    config.set_provider(LlmProvider::Local);
    assert_eq!(config.llm.model, "llama3.3:70b");
}
