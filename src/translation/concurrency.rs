/*!
 * Request concurrency and pacing settings.
 *
 * The orchestrator reads only the numeric fields; `mode` records which
 * preset produced them.
 */

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Preset tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    Low,
    #[default]
    Medium,
    High,
    Custom,
}

impl ConcurrencyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConcurrencyMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "custom" => Ok(Self::Custom),
            _ => Err(anyhow!("Invalid concurrency mode: {}", s)),
        }
    }
}

/// Bounds on in-flight requests and the pause between them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcurrencySettings {
    // @field: Max requests in flight; 1 selects sequential mode
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    // @field: Entries per batch in concurrent mode
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    // @field: Fixed delay after each entry or batch
    #[serde(default = "default_delay_ms")]
    pub delay_between_requests_ms: u64,

    // @field: Preset tag
    #[serde(default)]
    pub mode: ConcurrencyMode,
}

impl ConcurrencySettings {
    /// Settings for a preset. `Custom` starts from the medium values.
    pub fn preset(mode: ConcurrencyMode) -> Self {
        let (max_concurrent, batch_size, delay_between_requests_ms) = match mode {
            ConcurrencyMode::Low => (1, 3, 500),
            ConcurrencyMode::Medium | ConcurrencyMode::Custom => (3, 5, 200),
            ConcurrencyMode::High => (6, 8, 100),
        };
        Self {
            max_concurrent,
            batch_size,
            delay_between_requests_ms,
            mode,
        }
    }

    /// User-supplied values, tagged `custom`
    pub fn custom(max_concurrent: usize, batch_size: usize, delay_between_requests_ms: u64) -> Self {
        Self {
            max_concurrent,
            batch_size,
            delay_between_requests_ms,
            mode: ConcurrencyMode::Custom,
        }
    }

    pub fn is_sequential(&self) -> bool {
        self.max_concurrent <= 1
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms)
    }

    /// Clamp the counts to at least one
    pub fn normalized(&self) -> Self {
        Self {
            max_concurrent: self.max_concurrent.max(1),
            batch_size: self.batch_size.max(1),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(anyhow!("max_concurrent must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be at least 1"));
        }
        Ok(())
    }
}

impl Default for ConcurrencySettings {
    fn default() -> Self {
        Self::preset(ConcurrencyMode::default())
    }
}

fn default_max_concurrent() -> usize {
    3
}

fn default_batch_size() -> usize {
    5
}

fn default_delay_ms() -> u64 {
    200
}
