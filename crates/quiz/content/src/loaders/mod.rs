//! Content loaders for reading question data from files.
//!
//! Loaders convert RON/TOML files into the quiz-core types the engines
//! consume. The embedded standard content in [`crate::builtin`] goes through
//! the same parsers.

pub mod bank;
pub mod halls;
pub mod rules;

pub use bank::BankLoader;
pub use halls::HallLoader;
pub use rules::RulesLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
