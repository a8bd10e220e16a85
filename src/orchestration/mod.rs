//! Orchestration layer for album traversal.
//!
//! Each sub-module owns one step of the fix-up workflow:
//! - `dialog`: open the edit dialog and wait for it to settle
//! - `changes`: apply queued field edits and verify each one
//! - `finalize`: save or cancel the dialog
//! - `navigation`: advance to the next photo
//! - `album`: per-photo state machine and the album loop
//!
//! Every step runs against a `Session`, which carries the host surface,
//! the scheduler and the configuration.

pub mod album;
pub mod changes;
pub mod dialog;
pub mod finalize;
pub mod navigation;

pub use album::{fix_album, fix_current_photo, traverse_album, AlbumReport, PhotoOutcome};
pub use changes::{
    apply_changes, build_change_queue, ChangeDescriptor, ChangeQueue, ChangeTarget, CustomAction,
    TimezoneSelection,
};
pub use dialog::{open_dialog, StabilityTracker};
pub use finalize::{cancel, save, Finalized, PulseTracker};
pub use navigation::request_next;

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{FixError, Result, WaitPhase};
use crate::surface::{ControlHandle, HostSurface};
use crate::utils::poll::{poll_until, Deadline, Jitter, Scheduler, TokioScheduler};

/// Capabilities shared by every orchestration step.
#[derive(Clone)]
pub struct Session {
    pub surface: Arc<dyn HostSurface>,
    pub scheduler: Arc<dyn Scheduler>,
    pub config: Arc<Config>,
}

impl Session {
    pub fn new(
        surface: Arc<dyn HostSurface>,
        scheduler: Arc<dyn Scheduler>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            surface,
            scheduler,
            config,
        }
    }

    /// Session driven by tokio timers at the configured frame rate.
    pub fn with_tokio(surface: Arc<dyn HostSurface>, config: Config) -> Self {
        let scheduler = Arc::new(TokioScheduler::new(config.pacing.frame()));
        Self::new(surface, scheduler, Arc::new(config))
    }

    pub(crate) fn surface(&self) -> &dyn HostSurface {
        self.surface.as_ref()
    }

    /// Deadline `timeout` from now on the scheduler's clock.
    pub(crate) fn deadline(&self, timeout: Duration) -> Deadline {
        Deadline::after(self.scheduler.now(), timeout)
    }

    pub(crate) async fn pause(&self, jitter: Jitter) {
        self.scheduler.sleep(jitter.sample()).await;
    }

    /// Click `handle` after a randomized delay.
    pub(crate) async fn click_after(&self, jitter: Jitter, handle: &ControlHandle) -> Result<()> {
        self.pause(jitter).await;
        self.surface.click(handle)?;
        Ok(())
    }

    /// Poll `condition` until it holds, settling afterwards.
    pub(crate) async fn wait_until<F>(
        &self,
        phase: WaitPhase,
        deadline: Deadline,
        condition: F,
    ) -> Result<()>
    where
        F: FnMut() -> bool + Send,
    {
        poll_until(
            self.scheduler.as_ref(),
            deadline,
            self.config.pacing.settle,
            condition,
        )
        .await
        .map_err(|source| FixError::timeout(phase, source))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
