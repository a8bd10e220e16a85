//! album-tzfix - photo album timezone repair
//!
//! Walks a web photo album one item at a time and moves every photo's
//! capture timezone to a configured target while keeping the displayed
//! capture date and time. All work happens through simulated interactions
//! with the host page, each confirmed by deadline-bounded polling.

pub mod config;
pub mod error;
pub mod metadata;
pub mod orchestration;
pub mod surface;
pub mod utils;

pub use config::Config;
pub use error::{FixError, Result, WaitPhase};
pub use metadata::{extract_current, PhotoMetadata};
pub use orchestration::{fix_album, traverse_album, AlbumReport, PhotoOutcome, Session};
pub use surface::{ControlHandle, ControlRole, DateField, HostSurface, Position};
