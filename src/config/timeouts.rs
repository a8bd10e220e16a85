//! Per-phase wait budgets.

use std::time::Duration;

use serde::Deserialize;

/// Default budget for the edit dialog to open or close.
pub const DEFAULT_DIALOG_TIMEOUT_MS: u64 = 10 * 1000;
/// Default budget for a single field edit to be confirmed.
pub const DEFAULT_UPDATE_TIMEOUT_MS: u64 = 8 * 1000;
/// Default budget for the save round-trip.
pub const DEFAULT_SAVING_TIMEOUT_MS: u64 = 10 * 1000;
/// Default budget for the next photo to load.
pub const DEFAULT_NEXT_PHOTO_TIMEOUT_MS: u64 = 20 * 1000;

/// Timeout budgets, one per waiting phase.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Dialog readiness and dialog close (cancel path).
    pub dialog_ms: u64,
    /// Confirmation of one change descriptor, including the timezone list.
    pub update_ms: u64,
    /// Save confirmation pulse.
    pub saving_ms: u64,
    /// Navigation to the next photo.
    pub next_photo_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            dialog_ms: DEFAULT_DIALOG_TIMEOUT_MS,
            update_ms: DEFAULT_UPDATE_TIMEOUT_MS,
            saving_ms: DEFAULT_SAVING_TIMEOUT_MS,
            next_photo_ms: DEFAULT_NEXT_PHOTO_TIMEOUT_MS,
        }
    }
}

impl TimeoutConfig {
    pub fn dialog(&self) -> Duration {
        Duration::from_millis(self.dialog_ms)
    }

    pub fn update(&self) -> Duration {
        Duration::from_millis(self.update_ms)
    }

    pub fn saving(&self) -> Duration {
        Duration::from_millis(self.saving_ms)
    }

    pub fn next_photo(&self) -> Duration {
        Duration::from_millis(self.next_photo_ms)
    }

    /// Uniform budget for every phase.
    pub fn uniform(ms: u64) -> Self {
        Self {
            dialog_ms: ms,
            update_ms: ms,
            saving_ms: ms,
            next_photo_ms: ms,
        }
    }
}
