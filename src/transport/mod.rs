/// Filesystem helpers for directory-backed sources.
pub mod fs;
