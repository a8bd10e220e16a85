//! Change applicator.
//!
//! Consumes a queue of change descriptors against an open edit dialog.
//! Each applied change is confirmed by three signals holding together: the
//! descriptor's own check, a changed field fingerprint and a changed dialog
//! caption. Once the queue drains, the dialog is saved if anything was
//! applied and cancelled otherwise.

mod timezone;

pub use timezone::TimezoneSelection;

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::finalize::{self, Finalized};
use super::Session;
use crate::config::Config;
use crate::error::{FixError, Result, WaitPhase};
use crate::metadata::CaptureFields;
use crate::surface::{ControlHandle, ControlRole, DateField, HostSurface};

/// A change that cannot be expressed as a single field assignment.
#[async_trait]
pub trait CustomAction: Send + Sync {
    /// Perform the interaction sequence that applies the change.
    async fn invoke(&self, session: &Session, dialog: &ControlHandle) -> Result<()>;

    /// Whether the dialog already reflects the change. Must be a pure read.
    fn verify(&self, surface: &dyn HostSurface, dialog: &ControlHandle) -> bool;
}

/// How a descriptor is applied.
pub enum ChangeTarget {
    Field(DateField),
    Custom(Box<dyn CustomAction>),
}

impl std::fmt::Debug for ChangeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A single requested change with its own confirmation rule.
#[derive(Debug)]
pub struct ChangeDescriptor {
    pub description: String,
    pub target: ChangeTarget,
    pub expected: String,
}

impl ChangeDescriptor {
    pub fn field(field: DateField, expected: impl Into<String>) -> Self {
        Self {
            description: field.to_string(),
            target: ChangeTarget::Field(field),
            expected: expected.into(),
        }
    }

    pub fn custom(
        description: impl Into<String>,
        action: Box<dyn CustomAction>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            target: ChangeTarget::Custom(action),
            expected: expected.into(),
        }
    }

    /// Whether the dialog currently holds the requested value.
    pub fn holds(&self, surface: &dyn HostSurface, dialog: &ControlHandle) -> bool {
        match &self.target {
            ChangeTarget::Field(field) => {
                surface.read_field(dialog, *field).as_deref() == Some(self.expected.as_str())
            }
            ChangeTarget::Custom(action) => action.verify(surface, dialog),
        }
    }
}

/// Ordered changes for one photo.
pub type ChangeQueue = VecDeque<ChangeDescriptor>;

/// Changes for a photo in application order.
///
/// The timezone goes first because picking it can make the host recompute
/// the displayed date and time; the fields then restore the captured values.
pub fn build_change_queue(capture: &CaptureFields, config: &Config) -> ChangeQueue {
    let mut queue = ChangeQueue::with_capacity(DateField::ALL.len() + 1);
    queue.push_back(ChangeDescriptor::custom(
        "timezone",
        Box::new(TimezoneSelection::new(&config.target_timezone)),
        &config.target_timezone,
    ));
    for field in DateField::ALL {
        queue.push_back(ChangeDescriptor::field(
            field,
            capture.value_for(field, &config.locale),
        ));
    }
    queue
}

/// Apply every queued change, then save or cancel the dialog.
///
/// `needs_save` carries whether an earlier change was already applied. The
/// first change that cannot be confirmed aborts the run; the remaining
/// descriptors are left untouched.
#[tracing::instrument(name = "changes.apply", skip_all, fields(queued = queue.len()))]
pub async fn apply_changes(
    session: &Session,
    dialog: &ControlHandle,
    mut queue: ChangeQueue,
    save_control: Option<&ControlHandle>,
    mut needs_save: bool,
) -> Result<Finalized> {
    while let Some(change) = queue.pop_front() {
        needs_save |= apply_one(session, dialog, &change).await?;
    }

    if needs_save {
        finalize::save(session, save_control).await
    } else {
        finalize::cancel(session).await
    }
}

/// Apply one descriptor. Returns whether anything was changed.
async fn apply_one(
    session: &Session,
    dialog: &ControlHandle,
    change: &ChangeDescriptor,
) -> Result<bool> {
    let surface = session.surface();
    let fingerprint_before = fingerprint(surface, dialog);
    let caption_before = caption(surface);
    info!(change = %change.description, value = %change.expected, "Processing");

    let deadline = session.deadline(session.config.timeouts.update());
    let mutated = match &change.target {
        ChangeTarget::Custom(action) => {
            if action.verify(surface, dialog) {
                false
            } else {
                session.pause(session.config.pacing.action).await;
                action
                    .invoke(session, dialog)
                    .await
                    .map_err(|err| match err {
                        FixError::Surface(_) => err,
                        err => not_set(change, &err),
                    })?;
                true
            }
        }
        ChangeTarget::Field(field) => match surface.read_field(dialog, *field) {
            Some(current) if current != change.expected => {
                debug!(change = %change.description, from = %current, "Updating field");
                surface.write_field(dialog, *field, &change.expected)?;
                // Touching AM/PM makes the host recompute the whole form.
                surface.click_field(dialog, DateField::AmPm)?;
                surface.click_field(dialog, DateField::AmPm)?;
                true
            }
            _ => false,
        },
    };

    if !mutated {
        debug!(change = %change.description, "Already set");
        return Ok(false);
    }

    session
        .wait_until(WaitPhase::FieldUpdate, deadline, || {
            change.holds(surface, dialog)
                && fingerprint(surface, dialog) != fingerprint_before
                && caption(surface) != caption_before
        })
        .await
        .map_err(|err| not_set(change, &err))?;

    info!(change = %change.description, "Updated");
    Ok(true)
}

/// A change the host did not take.
fn not_set(change: &ChangeDescriptor, err: &FixError) -> FixError {
    warn!(change = %change.description, value = %change.expected, %err,
        "Looks like requested value was not set");
    FixError::VerificationFailed {
        description: change.description.clone(),
        expected: change.expected.clone(),
    }
}

/// Concatenated values of every watched field.
fn fingerprint(surface: &dyn HostSurface, dialog: &ControlHandle) -> String {
    DateField::WATCHED
        .iter()
        .map(|field| surface.read_field(dialog, *field).unwrap_or_default())
        .collect()
}

fn caption(surface: &dyn HostSurface) -> String {
    surface
        .find_control(ControlRole::DialogCaption)
        .and_then(|handle| surface.read_label(&handle))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
