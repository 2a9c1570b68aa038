//! Local filesystem traversal.

pub mod walker;

pub use walker::{FileEntry, FileWalker};
