//! Step definitions for album traversal scenarios.

pub mod traversal;
