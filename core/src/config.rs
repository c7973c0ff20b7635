//! Engine configuration.
//!
//! All sections and fields are optional in the TOML form; missing values
//! take the defaults below. Loading files is left to the host.
//!
//! ```toml
//! [animation]
//! enabled = true
//! duration_ms = 250
//! easing = "ease-in-out"
//!
//! [history]
//! max_undo = 100
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::animation::Easing;
use crate::command::DEFAULT_MAX_UNDO;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub animation: AnimationConfig,
    pub history: HistoryConfig,
}

/// Animation timing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// When `false`, animated commands settle on the frame they run.
    pub enabled: bool,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl AnimationConfig {
    /// Effective duration; zero when animations are disabled.
    pub fn duration(&self) -> Duration {
        if self.enabled {
            Duration::from_millis(self.duration_ms)
        } else {
            Duration::ZERO
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_ms: 250,
            easing: Easing::Linear,
        }
    }
}

/// Undo history limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Oldest entries are evicted beyond this depth.
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}
