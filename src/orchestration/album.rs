//! Album traversal.
//!
//! Fixes the current photo, then advances until the album runs out. Any
//! failure while fixing a photo stops the run; a missing next control is
//! the normal end of the album.

use tracing::{error, info, warn};

use super::changes::{apply_changes, build_change_queue};
use super::dialog::open_dialog;
use super::finalize::Finalized;
use super::navigation::request_next;
use super::Session;
use crate::error::{FixError, Result};
use crate::metadata::{extract_current, CaptureFields, PhotoState};
use crate::surface::ControlRole;

/// What happened to a single photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOutcome {
    /// Timezone already matched; no dialog was opened.
    Skipped,
    /// At least one change was applied and saved.
    Saved,
    /// Dialog was reviewed and closed without changes.
    Unchanged,
}

/// Tally of a traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlbumReport {
    pub visited: usize,
    pub skipped: usize,
    pub saved: usize,
    pub unchanged: usize,
}

impl AlbumReport {
    pub fn record(&mut self, outcome: PhotoOutcome) {
        self.visited += 1;
        match outcome {
            PhotoOutcome::Skipped => self.skipped += 1,
            PhotoOutcome::Saved => self.saved += 1,
            PhotoOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

/// Bring the displayed photo to the target timezone.
#[tracing::instrument(name = "album.photo", skip_all)]
pub async fn fix_current_photo(session: &Session) -> Result<PhotoOutcome> {
    let Some(details) = extract_current(session.surface(), &session.config) else {
        error!("Unable to find photo details");
        return Err(FixError::MissingDetails);
    };

    match details.state {
        PhotoState::AlreadyCorrect { reason } => {
            info!(filename = %details.filename, %reason, "Skipping current photo");
            Ok(PhotoOutcome::Skipped)
        }
        PhotoState::Capture(capture) => update_photo(session, &details.filename, &capture).await,
        PhotoState::Unreadable {
            date_text,
            time_text,
        } => {
            error!(
                filename = %details.filename,
                date = %date_text,
                time = %time_text,
                "Unable to read photo capture date"
            );
            Err(FixError::MissingDetails)
        }
    }
}

async fn update_photo(
    session: &Session,
    filename: &str,
    capture: &CaptureFields,
) -> Result<PhotoOutcome> {
    info!(%filename, "Working on photo");

    let dialog = open_dialog(session).await?;
    let save_control = session.surface().find_control(ControlRole::SaveButton);
    let queue = build_change_queue(capture, &session.config);

    info!(%filename, "Editing photo details");
    let finalized = apply_changes(session, &dialog, queue, save_control.as_ref(), false).await?;

    Ok(match finalized {
        Finalized::Saved => PhotoOutcome::Saved,
        Finalized::Cancelled => PhotoOutcome::Unchanged,
    })
}

/// Fix every photo from the current one to the end of the album.
///
/// Returns the tally when the album runs out. A navigation that never
/// lands also ends the album.
#[tracing::instrument(name = "album.traverse", skip_all)]
pub async fn traverse_album(session: &Session) -> Result<AlbumReport> {
    let mut report = AlbumReport::default();

    loop {
        let outcome = fix_current_photo(session).await.inspect_err(|err| {
            error!(%err, visited = report.visited, "Unable to fix current photo, stopping");
        })?;
        report.record(outcome);

        info!("Requesting next photo");
        match request_next(session).await {
            Ok(()) => {}
            Err(err) if err.is_end_of_album() => {
                info!(visited = report.visited, "Reached end of the album");
                break;
            }
            Err(err) => {
                warn!(%err, "Next photo never loaded, treating as end of the album");
                break;
            }
        }
    }

    Ok(report)
}

/// Traverse the album and log the overall result.
pub async fn fix_album(session: &Session) -> Result<AlbumReport> {
    match traverse_album(session).await {
        Ok(report) => {
            info!(
                visited = report.visited,
                skipped = report.skipped,
                saved = report.saved,
                unchanged = report.unchanged,
                "Everything is done :)"
            );
            Ok(report)
        }
        Err(err) => {
            error!(%err, "Not all photos fixed");
            Err(err)
        }
    }
}
