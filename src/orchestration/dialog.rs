//! Edit dialog opening.
//!
//! The dialog slides in with an animation. Editing starts only after every
//! date/time input is populated, the timezone display has text and the
//! dialog has stopped moving.

use std::collections::VecDeque;

use tracing::{info, warn};

use super::Session;
use crate::error::{FixError, Result, WaitPhase};
use crate::surface::{ControlHandle, ControlRole, DateField, HostSurface, Position};

/// Detects when an element has stopped moving.
///
/// Keeps the most recent `window` positions. Once the window is full, the
/// oldest sample is dropped and compared against what remains.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    window: usize,
    samples: VecDeque<Position>,
}

impl StabilityTracker {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            samples: VecDeque::with_capacity(window + 1),
        }
    }

    /// Record one sample. Returns true when the window reports no movement.
    ///
    /// A missing position is not recorded and never reports stable.
    pub fn observe(&mut self, position: Option<Position>) -> bool {
        let Some(position) = position else {
            return false;
        };
        self.samples.push_back(position);
        if self.samples.len() < self.window {
            return false;
        }

        match self.samples.pop_front() {
            Some(oldest) => self.samples.iter().all(|p| *p == oldest),
            None => false,
        }
    }
}

/// Open the edit dialog for the current photo and wait until it is editable.
#[tracing::instrument(name = "dialog.open", skip_all)]
pub async fn open_dialog(session: &Session) -> Result<ControlHandle> {
    let surface = session.surface();
    let Some(edit) = surface.find_control(ControlRole::EditDateButton) else {
        warn!("Edit option not available");
        return Err(FixError::NotFound(ControlRole::EditDateButton));
    };

    info!("Opening edit dialog");
    let deadline = session.deadline(session.config.timeouts.dialog());
    session.click_after(session.config.pacing.click, &edit).await?;

    let mut stability = StabilityTracker::new(session.config.stability_window);
    session
        .wait_until(WaitPhase::DialogReady, deadline, || {
            dialog_ready(surface, &mut stability)
        })
        .await
        .inspect_err(|err| warn!(%err, "Edit dialog never became ready"))?;

    surface
        .find_control(ControlRole::Dialog)
        .ok_or(FixError::NotFound(ControlRole::Dialog))
}

fn dialog_ready(surface: &dyn HostSurface, stability: &mut StabilityTracker) -> bool {
    let dialog = surface.find_control(ControlRole::Dialog);
    let settled = stability.observe(dialog.as_ref().and_then(|d| surface.position(d)));

    let Some(dialog) = dialog else {
        return false;
    };

    let fields_populated = DateField::ALL.iter().all(|field| {
        surface
            .read_field(&dialog, *field)
            .is_some_and(|value| !value.is_empty())
    });
    let timezone_shown = surface
        .find_all(ControlRole::TimezoneOption)
        .first()
        .and_then(|option| surface.read_label(option))
        .is_some_and(|label| !label.is_empty());

    fields_populated && timezone_shown && settled
}
