use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::app_config::Config;
use crate::errors::SubtitleError;
use crate::file_utils::{FileManager, format_file_size};
use crate::language_utils;
use crate::providers::{Translator, create_translator};
use crate::subtitle::{self, SubtitleFile, SubtitleFormat};
use crate::translation::{RunControl, TranslationEvent, TranslationOrchestrator, TranslationStatus};

// @module: Application controller for subtitle processing

// @const: Entries sampled when guessing the source language
const DETECTION_ENTRIES: usize = 20;

/// Counts reported after a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Backend override; built from the config when absent
    translator: Option<Arc<dyn Translator>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            translator: None,
        })
    }

    /// Create a controller that uses `translator` instead of the configured provider
    pub fn with_translator(config: Config, translator: Arc<dyn Translator>) -> Result<Self> {
        Ok(Self {
            config,
            translator: Some(translator),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one subtitle file into `output_dir`.
    ///
    /// Returns the written path, or `None` when the output already exists and
    /// `force_overwrite` is off.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let start_time = Instant::now();

        let file = Self::load_subtitle(input_file)?;
        let output_format = self.config.output_format.unwrap_or(file.format);
        let output_path =
            FileManager::generate_output_path(input_file, output_dir, &self.config.target_language, output_format);

        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(None);
        }

        let source_language = self.resolve_source_language(&file);
        let translator = self
            .translator
            .clone()
            .unwrap_or_else(|| create_translator(&self.config.llm, self.config.quality));
        let orchestrator = TranslationOrchestrator::new(translator, self.config.concurrency.clone());

        info!(
            "{} - {} ({} -> {})",
            self.config.llm.display_name(),
            self.config.llm.model,
            source_language,
            self.config.target_language
        );
        orchestrator
            .validate()
            .await
            .context("Translation provider is not reachable")?;

        let progress_bar = multi_progress.add(ProgressBar::new(file.len() as u64));
        progress_bar.set_style(progress_style("entries"));
        progress_bar.set_message("Translating");

        let events_task = spawn_progress_updates(&orchestrator, progress_bar.clone());
        let interrupt_task = spawn_interrupt_handler(orchestrator.control());

        let result = orchestrator
            .translate_file(file, &source_language, &self.config.target_language)
            .await;

        interrupt_task.abort();
        events_task.abort();
        progress_bar.finish_and_clear();

        let translated = result?;
        let content = subtitle::export(&translated, output_format);
        FileManager::write_to_file(&output_path, &content)?;

        info!(
            "Success: {} ({} entries, {}) in {}",
            output_path.display(),
            translated.len(),
            format_file_size(content.len() as u64),
            format_duration(start_time.elapsed())
        );

        Ok(Some(output_path))
    }

    /// Translate every subtitle file under `input_dir`, next to its source.
    /// A failed file is logged and counted; the walk continues.
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let target_suffix = format!("_{}", self.config.target_language);
        let files: Vec<PathBuf> = FileManager::find_subtitle_files(&input_dir)?
            .into_iter()
            .filter(|path| {
                !path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().ends_with(&target_suffix))
                    .unwrap_or(false)
            })
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut summary = FolderSummary::default();

        for path in &files {
            let file_name = path
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| input_dir.clone());

            match self
                .run_with_progress(path, &output_dir, &multi_progress, force_overwrite)
                .await
            {
                Ok(Some(_)) => summary.translated += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    if is_cancellation(&e) {
                        folder_pb.abandon_with_message("Cancelled");
                        return Err(e);
                    }
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {} translated, {} skipped, {} errors",
            format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }

    /// Re-export a subtitle file in another format without translating it
    pub fn convert(input_file: &Path, format: SubtitleFormat, output_dir: &Path) -> Result<PathBuf> {
        let file = Self::load_subtitle(input_file)?;

        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "subtitle".to_string());
        let mut output_path = output_dir.join(format!("{}.{}", stem, format.extension()));
        if output_path == input_file {
            output_path = output_dir.join(format!("{}_converted.{}", stem, format.extension()));
        }

        FileManager::write_to_file(&output_path, &subtitle::export(&file, format))?;
        info!(
            "Converted {} ({}) to {} ({} entries)",
            input_file.display(),
            file.format,
            output_path.display(),
            file.len()
        );
        Ok(output_path)
    }

    /// Read, validate and parse a subtitle file, refusing files without entries
    pub fn load_subtitle(input_file: &Path) -> Result<SubtitleFile> {
        FileManager::validate_subtitle_path(input_file)?;
        let content = FileManager::read_subtitle(input_file)?;

        let name = input_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = subtitle::parse(&content, &name, None).with_context(|| format!("Failed to parse {:?}", input_file))?;

        if file.is_empty() {
            return Err(SubtitleError::NoEntries(name).into());
        }
        Ok(file)
    }

    fn resolve_source_language(&self, file: &SubtitleFile) -> String {
        if !self.config.source_language.eq_ignore_ascii_case("auto") {
            return self.config.source_language.clone();
        }

        let sample = file
            .entries
            .iter()
            .take(DETECTION_ENTRIES)
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let detected = language_utils::detect_language(&sample);
        info!("Detected source language: {}", language_utils::get_language_display_name(detected));
        detected.to_string()
    }
}

fn is_cancellation(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<crate::errors::TranslationError>()
        .map(|e| e.is_cancelled())
        .unwrap_or(false)
}

fn progress_style(unit: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        ))
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

/// Mirror orchestrator events onto a progress bar until aborted
fn spawn_progress_updates(orchestrator: &TranslationOrchestrator, progress_bar: ProgressBar) -> JoinHandle<()> {
    let mut events = orchestrator.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(TranslationEvent::Progress(progress)) => {
                    progress_bar.set_position(progress.completed as u64);
                    if !progress.current.is_empty() {
                        progress_bar.set_message(progress.current);
                    }
                }
                Ok(TranslationEvent::Status(TranslationStatus::Paused)) => progress_bar.set_message("Paused"),
                Ok(TranslationEvent::Status(status)) if status.is_terminal() => break,
                Ok(TranslationEvent::Status(_)) => {}
                Err(RecvError::Lagged(skipped)) => debug!("Progress display skipped {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Cancel the run on Ctrl-C
fn spawn_interrupt_handler(control: RunControl) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling translation");
            control.cancel();
        }
    })
}

// Format duration in a human-readable format
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}
