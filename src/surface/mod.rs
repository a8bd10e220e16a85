//! Host surface adapter seam.
//!
//! This module contains:
//! - `HostSurface` trait: sampling and mutating the host page
//! - Control roles, date/time fields and positions the core needs
//! - Implementations: Mock (simulated album)
//!
//! The core never knows a particular page's markup. Adapters translate
//! roles into whatever selectors the host page needs.

use std::fmt;

pub mod mock;

pub use mock::{Interaction, MockPhoto, MockSurface, MockTimings, TimezonePolicy};

// ============================================================================
// Types
// ============================================================================

/// A UI element the core needs to locate on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlRole {
    /// Filename shown in the item's info panel.
    FilenameLabel,
    /// Capture date text shown in the info panel.
    DateLabel,
    /// Capture time text shown in the info panel.
    TimeLabel,
    /// Timezone text shown in the info panel.
    TimezoneLabel,
    /// Control that opens the date/time edit dialog.
    EditDateButton,
    /// The edit dialog container.
    Dialog,
    /// The edit dialog's header caption.
    DialogCaption,
    /// Clickable timezone display that reveals the timezone list.
    TimezoneSelector,
    /// Timezone entries. Only the selected entry while the list is collapsed.
    TimezoneOption,
    /// Dialog save control.
    SaveButton,
    /// Dialog cancel control.
    CancelButton,
    /// Transient "date changed" notification.
    DateChangedNotice,
    /// Control that advances to the next item in the album.
    NextPhotoButton,
}

impl fmt::Display for ControlRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FilenameLabel => "filename label",
            Self::DateLabel => "date label",
            Self::TimeLabel => "time label",
            Self::TimezoneLabel => "timezone label",
            Self::EditDateButton => "edit date control",
            Self::Dialog => "edit dialog",
            Self::DialogCaption => "dialog caption",
            Self::TimezoneSelector => "timezone selector",
            Self::TimezoneOption => "timezone option",
            Self::SaveButton => "save control",
            Self::CancelButton => "cancel control",
            Self::DateChangedNotice => "date changed notification",
            Self::NextPhotoButton => "next photo control",
        };
        f.write_str(name)
    }
}

/// Date/time sub-fields of the edit dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Hour,
    Minutes,
    AmPm,
    Year,
    Month,
    Day,
}

impl DateField {
    /// Dialog inputs, in the order they are edited.
    pub const ALL: [DateField; 6] = [
        DateField::Hour,
        DateField::Minutes,
        DateField::AmPm,
        DateField::Year,
        DateField::Month,
        DateField::Day,
    ];

    /// Order in which field values are concatenated into a fingerprint.
    pub const WATCHED: [DateField; 6] = [
        DateField::Year,
        DateField::Month,
        DateField::Day,
        DateField::Hour,
        DateField::Minutes,
        DateField::AmPm,
    ];
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hour => "hour",
            Self::Minutes => "minutes",
            Self::AmPm => "am/pm",
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        };
        f.write_str(name)
    }
}

/// Opaque reference to an element, minted by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlHandle(String);

impl ControlHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// On-screen offset of an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

// ============================================================================
// Traits
// ============================================================================

/// Errors an adapter reports when an interaction cannot be delivered.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("Control '{0}' is no longer attached")]
    Detached(String),

    #[error("Interaction rejected: {0}")]
    Rejected(String),
}

/// Interface to the host page.
///
/// Reads are synchronous samples of current page state and must not have
/// side effects; the core calls them from poll conditions on every tick.
/// Clicks and writes are fire-and-forget: the host acknowledges nothing,
/// so every effect is confirmed by sampling afterwards.
///
/// Implementations:
/// - `MockSurface`: time-driven in-memory album for tests and dry runs
pub trait HostSurface: Send + Sync {
    /// Locate zero or one element playing `role`.
    fn find_control(&self, role: ControlRole) -> Option<ControlHandle>;

    /// Locate every element playing `role`, in document order.
    fn find_all(&self, role: ControlRole) -> Vec<ControlHandle>;

    /// Current value of a date/time input inside `dialog`.
    fn read_field(&self, dialog: &ControlHandle, field: DateField) -> Option<String>;

    /// Assign a date/time input's value without triggering recomputation.
    fn write_field(
        &self,
        dialog: &ControlHandle,
        field: DateField,
        value: &str,
    ) -> Result<(), SurfaceError>;

    /// Text label of an element.
    fn read_label(&self, handle: &ControlHandle) -> Option<String>;

    /// Whether a list entry is marked selected.
    fn is_selected(&self, handle: &ControlHandle) -> bool;

    /// On-screen offset, `None` when the element is not displayed.
    fn position(&self, handle: &ControlHandle) -> Option<Position>;

    /// Simulated user click.
    fn click(&self, handle: &ControlHandle) -> Result<(), SurfaceError>;

    /// Simulated user click on a date/time input inside `dialog`.
    fn click_field(&self, dialog: &ControlHandle, field: DateField) -> Result<(), SurfaceError>;
}
