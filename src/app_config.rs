use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::providers::{LlmConfig, LlmProvider};
use crate::subtitle::SubtitleFormat;
use crate::translation::{ConcurrencyMode, ConcurrencySettings, TranslationQuality};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code, or `auto` to detect it from the subtitle text
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation backend settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Request concurrency and pacing
    #[serde(default)]
    pub concurrency: ConcurrencySettings,

    /// Speed/accuracy trade-off
    #[serde(default)]
    pub quality: TranslationQuality,

    /// Export format; `None` keeps the input format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<SubtitleFormat>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "zh-CN".to_string()
}

impl Config {
    /// Load configuration from a JSON file, creating it with defaults when missing
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }

    /// Load configuration from an existing JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).context(format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", path.display()))?;
        config.fill_defaults();
        Ok(config)
    }

    /// Fill values a hand-written file may leave empty
    pub fn fill_defaults(&mut self) {
        if self.llm.model.trim().is_empty() {
            self.llm.model = self.llm.provider.default_model().to_string();
        }
    }

    /// Write configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json).context(format!("Failed to write config to file: {}", path.display()))
    }

    /// Switch to a concurrency preset. `Custom` keeps the current numbers.
    pub fn apply_concurrency_mode(&mut self, mode: ConcurrencyMode) {
        self.concurrency = match mode {
            ConcurrencyMode::Custom => ConcurrencySettings {
                mode,
                ..self.concurrency.clone()
            },
            preset => ConcurrencySettings::preset(preset),
        };
    }

    /// Change provider, resetting the model to that provider's default when
    /// the current model belongs to another provider
    pub fn set_provider(&mut self, provider: LlmProvider) {
        if self.llm.provider != provider {
            if self.llm.model.is_empty() || self.llm.model == self.llm.provider.default_model() {
                self.llm.model = provider.default_model().to_string();
            }
            self.llm.provider = provider;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.source_language.eq_ignore_ascii_case("auto") {
            crate::language_utils::get_language_name(&self.source_language)?;
        }
        crate::language_utils::get_language_name(&self.target_language)?;

        self.concurrency.validate()?;

        if self.llm.model.trim().is_empty() {
            return Err(anyhow!("A model name is required for the {} provider", self.llm.provider));
        }

        if !self.llm.base_url.trim().is_empty() {
            Url::parse(self.llm.base_url.trim())
                .map_err(|e| anyhow!("Invalid base URL '{}': {}", self.llm.base_url, e))?;
        } else if self.llm.provider.requires_base_url() && self.llm.provider.default_base_url().is_empty() {
            return Err(anyhow!("A base URL is required for the {} provider", self.llm.provider));
        }

        if self.llm.provider.requires_api_key() && self.llm.api_key.trim().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                self.llm.provider.display_name()
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 2.0, got {}", self.llm.temperature));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            llm: LlmConfig::default(),
            concurrency: ConcurrencySettings::default(),
            quality: TranslationQuality::default(),
            output_format: None,
            log_level: LogLevel::default(),
        }
    }
}
