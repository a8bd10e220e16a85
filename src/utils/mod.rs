//! Pure utility functions.
//!
//! Binary bootstrap and the deadline-bounded polling primitive every wait
//! in the crate is built on.

pub mod bootstrap;
pub mod poll;
