//! Changelog body formatters

mod markdown;

pub use markdown::MarkdownFormatter;

use crate::types::ClassifiedCommit;

/// Trait for changelog body formatters
pub trait ChangelogFormatter: Send + Sync {
    /// Render classified commits, already grouped by category
    fn format(&self, commits: &[ClassifiedCommit]) -> String;
}
