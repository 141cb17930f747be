/*!
 * # subtitle-translator
 *
 * A Rust library for translating SRT, WebVTT and ASS subtitle files with
 * large language models.
 *
 * ## Features
 *
 * - Parse, serialize and auto-detect SRT, VTT and ASS/SSA subtitles
 * - Convert between the three formats through one canonical model
 * - Translate entries through OpenAI, Claude, Gemini, OpenAI-compatible
 *   services or local servers
 * - Sequential or batched concurrent runs with neighboring-line context
 * - Pause, resume and cancel with progress and status events
 * - Per-entry fallback to the source text when a line fails
 *
 * ## Architecture
 *
 * - `subtitle`: canonical model, format detection and the three codecs
 * - `translation`: the orchestrator and its concurrency, control, context
 *   and prompt helpers
 * - `providers`: the `Translator` capability and its backend adapters
 * - `app_config`: JSON configuration
 * - `app_controller`: file and folder workflows used by the CLI
 * - `file_utils`: reading, validating and naming subtitle files
 * - `language_utils`: language table, detection and ISO 639 lookups
 * - `errors`: error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use language_utils::{detect_language, get_language_name, language_codes_match};
pub use providers::{LlmConfig, LlmProvider, TranslationRequest, TranslationResponse, Translator, create_translator};
pub use subtitle::{SubtitleEntry, SubtitleFile, SubtitleFormat};
pub use translation::{
    ConcurrencyMode, ConcurrencySettings, RunControl, TranslationEvent, TranslationOrchestrator, TranslationProgress,
    TranslationQuality, TranslationStatus,
};
