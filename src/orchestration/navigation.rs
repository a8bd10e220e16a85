//! Navigation to the next photo in the album.

use tracing::{debug, info};

use super::Session;
use crate::error::{FixError, Result, WaitPhase};
use crate::metadata::current_filename;
use crate::surface::ControlRole;

/// Advance to the next photo and wait for it to be displayed.
///
/// Rejects with `NotFound(NextPhotoButton)` when the album has no next
/// photo. Arrival is detected by a different displayed filename; whether
/// the new photo's details are readable is left to the next fix attempt.
#[tracing::instrument(name = "navigation.next", skip_all)]
pub async fn request_next(session: &Session) -> Result<()> {
    let surface = session.surface();
    let previous = current_filename(surface);

    let Some(next) = surface.find_control(ControlRole::NextPhotoButton) else {
        debug!("No next photo control");
        return Err(FixError::NotFound(ControlRole::NextPhotoButton));
    };

    let deadline = session.deadline(session.config.timeouts.next_photo());
    session.click_after(session.config.pacing.click, &next).await?;
    session
        .wait_until(WaitPhase::NextPhoto, deadline, || {
            match (&previous, current_filename(surface)) {
                (Some(previous), Some(current)) => current != *previous,
                _ => false,
            }
        })
        .await?;

    info!("Next photo loaded");
    Ok(())
}
