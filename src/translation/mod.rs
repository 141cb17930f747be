/*!
 * Translation orchestration for subtitle files.
 *
 * This module drives subtitle entries through a translation backend. It is
 * split into several submodules:
 *
 * - `orchestrator`: the run loop (sequential or batched concurrent)
 * - `control`: pause/resume/cancel handle and event fan-out
 * - `progress`: progress snapshots, status and events
 * - `concurrency`: concurrency presets and pacing
 * - `context`: neighbor context and preview helpers
 * - `prompts`: prompt construction and quality levels
 */

pub use self::concurrency::{ConcurrencyMode, ConcurrencySettings};
pub use self::control::RunControl;
pub use self::orchestrator::TranslationOrchestrator;
pub use self::progress::{TranslationEvent, TranslationProgress, TranslationStatus};
pub use self::prompts::TranslationQuality;

pub mod concurrency;
pub mod context;
pub mod control;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
