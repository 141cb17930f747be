/*!
 * Mock translator implementations for testing.
 *
 * This module provides a scripted translator that simulates different behaviors:
 * - `MockTranslator::working()` - Always succeeds with `[target] text`
 * - `MockTranslator::failing()` - Every call returns a provider error
 * - `MockTranslator::error_response()` - Calls succeed but carry an error message
 * - `MockTranslator::intermittent(n)` - Every n-th call fails
 * - `MockTranslator::unconfigured()` - Reports missing configuration
 *
 * Specific texts can be made to fail with `failing_on`, and calls can be
 * slowed down to exercise concurrency and pause handling.
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::providers::{TranslationRequest, TranslationResponse, Translator};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always returns `Err`
    Failing,
    /// Returns `Ok` with the `error` field set
    ErrorResponse,
    /// Returns `Ok` with empty text and no error
    Empty,
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Reports itself as not configured
    Unconfigured,
}

/// Scripted translator. Clones share counters and recorded requests.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    fail_on: Arc<HashSet<String>>,
    delay_ms: u64,
    delay_fn: Option<fn(&TranslationRequest) -> u64>,
    custom_response: Option<fn(&TranslationRequest) -> String>,
    validation_result: bool,
    request_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<TranslationRequest>>>,
}

impl MockTranslator {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            fail_on: Arc::new(HashSet::new()),
            delay_ms: 0,
            delay_fn: None,
            custom_response: None,
            validation_result: true,
            request_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn error_response() -> Self {
        Self::new(MockBehavior::ErrorResponse)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    pub fn unconfigured() -> Self {
        Self::new(MockBehavior::Unconfigured)
    }

    /// Fail any request whose text is in `texts`
    pub fn failing_on<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fail_on = Arc::new(texts.into_iter().map(Into::into).collect());
        self
    }

    /// Sleep a fixed time on every call
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Sleep for a per-request duration in milliseconds
    pub fn with_delay_fn(mut self, delay: fn(&TranslationRequest) -> u64) -> Self {
        self.delay_fn = Some(delay);
        self
    }

    pub fn with_custom_response(mut self, generator: fn(&TranslationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Result of the next `validate_config` probe
    pub fn with_validation_result(mut self, valid: bool) -> Self {
        self.validation_result = valid;
        self
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of overlapping `translate` calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().clone()
    }

    fn response_for(&self, request: &TranslationRequest, count: usize) -> Result<TranslationResponse, ProviderError> {
        if self.fail_on.contains(&request.text) {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated failure for \"{}\"", request.text),
            });
        }

        match self.behavior {
            MockBehavior::Working => Ok(TranslationResponse::success(self.render(request), 0.9)),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::ErrorResponse => Ok(TranslationResponse::failure("Simulated error response")),
            MockBehavior::Empty => Ok(TranslationResponse::default()),
            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(TranslationResponse::success(self.render(request), 0.9))
                }
            }
            MockBehavior::Unconfigured => Err(ProviderError::NotConfigured("mock".to_string())),
        }
    }

    fn render(&self, request: &TranslationRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => format!("[{}] {}", request.target_language, request.text),
        }
    }
}

/// Decrements the in-flight counter when a call ends, however it ends
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let delay_ms = self.delay_fn.map_or(self.delay_ms, |delay| delay(request));
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        self.response_for(request, count)
    }

    fn is_configured(&self) -> bool {
        self.behavior != MockBehavior::Unconfigured
    }

    async fn validate_config(&self) -> bool {
        self.is_configured() && self.validation_result
    }

    fn name(&self) -> String {
        "Mock".to_string()
    }
}
