//! Pure domain utility functions.

pub mod format;
