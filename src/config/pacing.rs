//! Interaction pacing.
//!
//! Every simulated interaction is preceded by a randomized delay so the host
//! never sees instantaneous clicks, and every confirmed wait is followed by a
//! settle delay to tolerate animation lag.

use std::time::Duration;

use serde::Deserialize;

use crate::utils::poll::{Jitter, DEFAULT_FRAME_MS};

/// Delay ranges applied around interactions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after a poll condition first holds.
    pub settle: Jitter,
    /// Pause before clicking a control (open, save, cancel, next).
    pub click: Jitter,
    /// Pause before invoking a custom action.
    pub action: Jitter,
    /// Pause before picking an entry from a revealed list.
    pub option_pick: Jitter,
    /// Scheduler tick between poll samples.
    pub frame_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            settle: Jitter::new(200, 150),
            click: Jitter::new(500, 150),
            action: Jitter::new(1000, 500),
            option_pick: Jitter::new(800, 500),
            frame_ms: DEFAULT_FRAME_MS,
        }
    }
}

impl PacingConfig {
    /// Millisecond-scale pacing for test suites.
    pub fn brisk() -> Self {
        Self {
            settle: Jitter::new(1, 2),
            click: Jitter::new(1, 2),
            action: Jitter::new(2, 2),
            option_pick: Jitter::new(1, 2),
            frame_ms: 2,
        }
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pacing() {
        let pacing = PacingConfig::default();
        assert_eq!(pacing.settle, Jitter::new(200, 150));
        assert_eq!(pacing.click, Jitter::new(500, 150));
        assert_eq!(pacing.action, Jitter::new(1000, 500));
        assert_eq!(pacing.option_pick, Jitter::new(800, 500));
        assert_eq!(pacing.frame(), Duration::from_millis(16));
    }

    #[test]
    fn test_brisk_pacing_is_fast() {
        let pacing = PacingConfig::brisk();
        assert!(pacing.action.max() < Duration::from_millis(10));
        assert_eq!(pacing.frame_ms, 2);
    }
}
