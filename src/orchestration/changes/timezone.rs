//! Timezone selection: the one change that needs a list interaction.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::CustomAction;
use crate::error::{FixError, Result, WaitPhase};
use crate::orchestration::Session;
use crate::surface::{ControlHandle, ControlRole, HostSurface};

/// Opens the timezone list and picks the entry naming the target zone.
#[derive(Debug, Clone)]
pub struct TimezoneSelection {
    target: String,
}

impl TimezoneSelection {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl CustomAction for TimezoneSelection {
    async fn invoke(&self, session: &Session, _dialog: &ControlHandle) -> Result<()> {
        let surface = session.surface();
        let selector = surface
            .find_control(ControlRole::TimezoneSelector)
            .ok_or(FixError::NotFound(ControlRole::TimezoneSelector))?;
        surface.click(&selector)?;

        let deadline = session.deadline(session.config.timeouts.update());
        session
            .wait_until(WaitPhase::TimezoneList, deadline, || {
                surface.find_all(ControlRole::TimezoneOption).len() > 1
            })
            .await
            .inspect_err(|err| warn!(%err, "Timezone list box not available"))?;

        session.pause(session.config.pacing.option_pick).await;

        // The collapsed display stays first in the list; the entry to pick
        // is the last one naming the target.
        let option = surface
            .find_all(ControlRole::TimezoneOption)
            .into_iter()
            .rev()
            .find(|option| {
                surface
                    .read_label(option)
                    .is_some_and(|label| label.contains(&self.target))
            });

        match option {
            Some(option) => {
                debug!(timezone = %self.target, "Picking timezone");
                surface.click(&option)?;
                Ok(())
            }
            None => {
                warn!(timezone = %self.target, "Timezone not offered");
                Err(FixError::NotFound(ControlRole::TimezoneOption))
            }
        }
    }

    fn verify(&self, surface: &dyn HostSurface, _dialog: &ControlHandle) -> bool {
        surface
            .find_all(ControlRole::TimezoneOption)
            .iter()
            .find(|option| surface.is_selected(option))
            .and_then(|option| surface.read_label(option))
            .is_some_and(|label| label.contains(&self.target))
    }
}
