//! Error taxonomy for album traversal.

use std::fmt;

use crate::surface::{ControlRole, SurfaceError};
use crate::utils::poll::DeadlineElapsed;

/// Result type for orchestration steps.
pub type Result<T> = std::result::Result<T, FixError>;

/// The wait that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPhase {
    DialogReady,
    TimezoneList,
    FieldUpdate,
    SaveConfirmation,
    DialogClosed,
    NextPhoto,
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DialogReady => "dialog readiness",
            Self::TimezoneList => "timezone list",
            Self::FieldUpdate => "field update",
            Self::SaveConfirmation => "save confirmation",
            Self::DialogClosed => "dialog close",
            Self::NextPhoto => "next photo",
        };
        f.write_str(name)
    }
}

/// Errors that stop processing of the current photo or the whole album.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// An expected control is absent. Fatal or end-of-work depending on the role.
    #[error("{0} not found")]
    NotFound(ControlRole),

    #[error("Timed out waiting for {phase}: {source}")]
    Timeout {
        phase: WaitPhase,
        #[source]
        source: DeadlineElapsed,
    },

    #[error("Requested {description} value '{expected}' was not set")]
    VerificationFailed {
        description: String,
        expected: String,
    },

    #[error("Unable to find photo details")]
    MissingDetails,

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),
}

impl FixError {
    pub fn timeout(phase: WaitPhase, source: DeadlineElapsed) -> Self {
        Self::Timeout { phase, source }
    }

    /// Whether this rejection only signals that the album has no more photos.
    pub fn is_end_of_album(&self) -> bool {
        matches!(self, Self::NotFound(ControlRole::NextPhotoButton))
    }
}
