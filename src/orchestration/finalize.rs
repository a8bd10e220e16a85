//! Dialog finalization: save with round-trip confirmation, or cancel.

use tracing::{info, warn};

use super::Session;
use crate::error::{FixError, Result, WaitPhase};
use crate::surface::{ControlHandle, ControlRole, HostSurface};

/// Notification states a confirmed save must pass through: hidden, shown, hidden.
pub const SAVE_PULSE: &str = "010";

/// How the dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finalized {
    Saved,
    Cancelled,
}

/// Records edges of the "date changed" notification.
///
/// Each sample maps to '1' (shown) or '0' (hidden). A state is appended only
/// when it differs from the last one, so the progress string is a sequence
/// of transitions.
#[derive(Debug, Clone, Default)]
pub struct PulseTracker {
    progress: String,
}

impl PulseTracker {
    /// Record one sample. Returns true once the full pulse has been seen.
    pub fn observe(&mut self, shown: bool) -> bool {
        let state = if shown { '1' } else { '0' };
        if self.progress.chars().last() != Some(state) {
            self.progress.push(state);
        }
        self.progress == SAVE_PULSE
    }

    pub fn progress(&self) -> &str {
        &self.progress
    }
}

fn notice_shown(surface: &dyn HostSurface) -> bool {
    surface
        .find_control(ControlRole::DateChangedNotice)
        .and_then(|notice| surface.position(&notice))
        .is_some_and(|position| position.top > 0.0)
}

/// Save the dialog and wait for the host to confirm the change.
#[tracing::instrument(name = "finalize.save", skip_all)]
pub async fn save(session: &Session, save_control: Option<&ControlHandle>) -> Result<Finalized> {
    let surface = session.surface();
    let Some(save_control) = save_control else {
        warn!("Save option not available");
        return Err(FixError::NotFound(ControlRole::SaveButton));
    };

    info!("Some fields got updated, saving changes");
    let deadline = session.deadline(session.config.timeouts.saving());
    let mut pulse = PulseTracker::default();
    pulse.observe(notice_shown(surface));

    session
        .click_after(session.config.pacing.click, save_control)
        .await?;
    session
        .wait_until(WaitPhase::SaveConfirmation, deadline, || {
            pulse.observe(notice_shown(surface))
        })
        .await
        .inspect_err(|err| warn!(%err, "Save was not confirmed"))?;

    info!("Changes saved");
    Ok(Finalized::Saved)
}

/// Close the dialog without saving.
#[tracing::instrument(name = "finalize.cancel", skip_all)]
pub async fn cancel(session: &Session) -> Result<Finalized> {
    let surface = session.surface();
    let Some(cancel_control) = surface.find_control(ControlRole::CancelButton) else {
        warn!("Cancel option not available");
        return Err(FixError::NotFound(ControlRole::CancelButton));
    };

    info!("Details are correct, closing dialog without saving");
    let deadline = session.deadline(session.config.timeouts.dialog());
    session
        .click_after(session.config.pacing.click, &cancel_control)
        .await?;
    session
        .wait_until(WaitPhase::DialogClosed, deadline, || {
            surface.find_control(ControlRole::Dialog).is_none()
        })
        .await
        .inspect_err(|err| warn!(%err, "Dialog did not close"))?;

    Ok(Finalized::Cancelled)
}
