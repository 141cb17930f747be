/*!
 * Progress snapshots and lifecycle status events.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

/// Run lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Cancelled,
}

impl TranslationStatus {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Snapshot of one run's progress
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationProgress {
    pub total: usize,
    /// Never decreases during a run
    pub completed: usize,
    /// Preview of the most recently dispatched text
    pub current: String,
    /// Per-entry failures, append-only
    pub errors: Vec<String>,
}

impl TranslationProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Completion ratio in `0.0..=1.0`; an empty run counts as done
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Message published on the orchestrator's event channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEvent {
    Progress(TranslationProgress),
    Status(TranslationStatus),
}
