/*!
 * Error types for the subtitle translator.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::subtitle::SubtitleFormat;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The adapter is missing credentials, model or endpoint
    #[error("Provider is not configured: {0}")]
    NotConfigured(String),

    /// The backend answered without any translated text
    #[error("Provider returned an empty translation")]
    EmptyResponse,
}

/// Errors that can occur while reading or writing subtitle files
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Neither the file name nor the content identifies a supported format
    #[error("Unrecognized subtitle format. Supported formats: SRT, VTT, ASS")]
    UnrecognizedFormat,

    /// The file lacks the header its format requires
    #[error("Invalid {format} file: missing {expected} header")]
    MissingHeader {
        /// Format being parsed
        format: SubtitleFormat,
        /// Header that was expected
        expected: &'static str,
    },

    /// Parsing succeeded but yielded nothing to translate
    #[error("No subtitle entries found in {0}")]
    NoEntries(String),

    /// The file extension is not one of the supported subtitle extensions
    #[error("Unsupported file extension: {0}. Supported extensions: .srt, .vtt, .ass, .ssa")]
    UnsupportedExtension(String),

    /// The file exceeds the upload size limit
    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge {
        /// Actual file size
        size: u64,
        /// Maximum accepted size
        limit: u64,
    },
}

/// Errors that end a translation run
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The run was cancelled by its controller
    #[error("Translation cancelled")]
    Cancelled,

    /// The capability reported missing credentials or endpoint before dispatch
    #[error("Translation provider {0} is not configured")]
    NotConfigured(String),

    /// The live connectivity probe failed
    #[error("Configuration validation failed for {0}; check the API key, endpoint and model")]
    ValidationFailed(String),

    /// A run is already active on this orchestrator
    #[error("A translation run is already in progress")]
    AlreadyRunning,

    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl TranslationError {
    /// Whether the run ended because it was cancelled rather than failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
