/*!
 * Translation orchestrator.
 *
 * Drives the entries of a [`SubtitleFile`] through a [`Translator`]:
 * - `max_concurrent <= 1`: one entry at a time, delay after each entry
 * - otherwise: `batch_size` entries per batch with at most `max_concurrent`
 *   requests in flight, delay between batches
 *
 * Pause and cancel are checked before each entry or batch. A failed entry
 * is logged into the progress error list and keeps its source text as its
 * translation; it never aborts the run.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio::sync::broadcast;

use crate::errors::TranslationError;
use crate::providers::{TranslationRequest, Translator};
use crate::subtitle::{SubtitleEntry, SubtitleFile};

use super::concurrency::ConcurrencySettings;
use super::context::{build_context, preview};
use super::control::RunControl;
use super::progress::{TranslationEvent, TranslationProgress, TranslationStatus};

/// Clears the active flag when a run ends, however it ends
struct ActiveRun<'a>(&'a AtomicBool);

impl<'a> ActiveRun<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs translations of whole subtitle files, one run at a time
#[derive(Debug)]
pub struct TranslationOrchestrator {
    translator: Arc<dyn Translator>,
    settings: ConcurrencySettings,
    control: RunControl,
    active: AtomicBool,
}

impl TranslationOrchestrator {
    pub fn new(translator: Arc<dyn Translator>, settings: ConcurrencySettings) -> Self {
        Self {
            translator,
            settings,
            control: RunControl::default(),
            active: AtomicBool::new(false),
        }
    }

    /// Share an externally created control handle
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }

    pub fn settings(&self) -> &ConcurrencySettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ConcurrencySettings) {
        self.settings = settings;
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Handle for pausing, resuming or cancelling from another task
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TranslationEvent> {
        self.control.subscribe()
    }

    pub fn pause(&self) -> bool {
        self.control.pause()
    }

    pub fn resume(&self) -> bool {
        self.control.resume()
    }

    pub fn cancel(&self) {
        self.control.cancel()
    }

    pub fn status(&self) -> TranslationStatus {
        self.control.status()
    }

    /// Live probe of the translator's configuration
    pub async fn validate(&self) -> Result<(), TranslationError> {
        if !self.translator.is_configured() {
            return Err(TranslationError::NotConfigured(self.translator.name()));
        }
        if !self.translator.validate_config().await {
            return Err(TranslationError::ValidationFailed(self.translator.name()));
        }
        Ok(())
    }

    /// Translate every entry of `file`.
    ///
    /// Returns the file with `translated_text` set on every entry, or
    /// `TranslationError::Cancelled` and no file when the run is cancelled.
    pub async fn translate_file(
        &self,
        mut file: SubtitleFile,
        source_language: &str,
        target_language: &str,
    ) -> Result<SubtitleFile, TranslationError> {
        if !self.translator.is_configured() {
            return Err(TranslationError::NotConfigured(self.translator.name()));
        }
        let _active = ActiveRun::acquire(&self.active).ok_or(TranslationError::AlreadyRunning)?;

        let settings = self.settings.normalized();
        info!(
            "Translating {} entries of {} from {} to {} with {} (max {} concurrent, batch {}, {}ms delay)",
            file.entries.len(),
            file.name,
            source_language,
            target_language,
            self.translator.name(),
            settings.max_concurrent,
            settings.batch_size,
            settings.delay_between_requests_ms
        );

        self.control.begin();
        let mut progress = TranslationProgress::new(file.entries.len());
        self.control.emit_progress(&progress);

        let outcome = if settings.is_sequential() {
            self.run_sequential(&mut file, source_language, target_language, &settings, &mut progress)
                .await
        } else {
            self.run_concurrent(&mut file, source_language, target_language, &settings, &mut progress)
                .await
        };

        match outcome {
            Ok(()) => {
                self.control.set_status(TranslationStatus::Completed);
                info!(
                    "Translation of {} completed: {} entries, {} errors",
                    file.name,
                    progress.total,
                    progress.errors.len()
                );
                Ok(file)
            }
            Err(error) => {
                if error.is_cancelled() {
                    self.control.set_status(TranslationStatus::Cancelled);
                    warn!("Translation of {} cancelled after {} entries", file.name, progress.completed);
                }
                Err(error)
            }
        }
    }

    async fn run_sequential(
        &self,
        file: &mut SubtitleFile,
        source_language: &str,
        target_language: &str,
        settings: &ConcurrencySettings,
        progress: &mut TranslationProgress,
    ) -> Result<(), TranslationError> {
        let total = file.entries.len();

        for index in 0..total {
            self.control.checkpoint().await?;

            progress.current = preview(&file.entries[index].text);
            self.control.emit_progress(progress);

            let request = entry_request(&file.entries, index, source_language, target_language);
            let outcome = self.translate_one(&request).await;
            apply_outcome(&mut file.entries[index], outcome, &mut progress.errors);

            progress.completed = index + 1;
            self.control.emit_progress(progress);

            if index + 1 < total && settings.delay_between_requests_ms > 0 {
                tokio::time::sleep(settings.delay()).await;
            }
        }

        Ok(())
    }

    async fn run_concurrent(
        &self,
        file: &mut SubtitleFile,
        source_language: &str,
        target_language: &str,
        settings: &ConcurrencySettings,
        progress: &mut TranslationProgress,
    ) -> Result<(), TranslationError> {
        let total = file.entries.len();
        let mut batch_start = 0;

        while batch_start < total {
            self.control.checkpoint().await?;

            let batch_end = (batch_start + settings.batch_size).min(total);
            debug!("Dispatching entries {}..{} of {}", batch_start + 1, batch_end, total);

            let requests: Vec<(usize, TranslationRequest)> = (batch_start..batch_end)
                .map(|index| (index, entry_request(&file.entries, index, source_language, target_language)))
                .collect();

            let results = stream::iter(requests)
                .map(|(index, request)| async move { (index, self.translate_one(&request).await) })
                .buffer_unordered(settings.max_concurrent)
                .collect::<Vec<_>>()
                .await;

            // Completion order is arbitrary; write back by index
            for (index, outcome) in results {
                apply_outcome(&mut file.entries[index], outcome, &mut progress.errors);
            }

            progress.completed = batch_end;
            progress.current = preview(&file.entries[batch_end - 1].text);
            self.control.emit_progress(progress);

            if batch_end < total && settings.delay_between_requests_ms > 0 {
                tokio::time::sleep(settings.delay()).await;
            }
            batch_start = batch_end;
        }

        Ok(())
    }

    /// Translate plain strings in `batch_size` groups without context.
    ///
    /// Failed items come back as empty strings; the output has the same
    /// length and order as `texts`. Not subject to pause or cancel.
    pub async fn translate_texts(&self, texts: &[String], source_language: &str, target_language: &str) -> Vec<String> {
        let settings = self.settings.normalized();
        let mut results = Vec::with_capacity(texts.len());

        for (chunk_index, chunk) in texts.chunks(settings.batch_size).enumerate() {
            if chunk_index > 0 && settings.delay_between_requests_ms > 0 {
                tokio::time::sleep(settings.delay()).await;
            }

            let requests: Vec<TranslationRequest> = chunk
                .iter()
                .map(|text| TranslationRequest::new(text.as_str(), source_language, target_language))
                .collect();

            let translated = join_all(requests.iter().map(|request| self.translate_one(request))).await;
            results.extend(translated.into_iter().map(|outcome| outcome.unwrap_or_default()));
        }

        results
    }

    async fn translate_one(&self, request: &TranslationRequest) -> Result<String, String> {
        match self.translator.translate(request).await {
            Ok(response) => response.into_text(),
            Err(error) => Err(error.to_string()),
        }
    }
}

fn entry_request(entries: &[SubtitleEntry], index: usize, source_language: &str, target_language: &str) -> TranslationRequest {
    TranslationRequest::new(entries[index].text.as_str(), source_language, target_language)
        .with_context(build_context(entries, index))
}

/// Record a result on its entry; failures fall back to the source text
fn apply_outcome(entry: &mut SubtitleEntry, outcome: Result<String, String>, errors: &mut Vec<String>) {
    match outcome {
        Ok(text) => entry.translated_text = Some(text),
        Err(reason) => {
            warn!("Entry {} failed to translate: {}", entry.id, reason);
            errors.push(format!("entry {}: {}", entry.id, reason));
            entry.translated_text = Some(entry.text.clone());
        }
    }
}
