//! relnotes Changelog - Changelog synthesis from host commit history
//!
//! This crate resolves release boundaries, fetches the commits between them,
//! classifies those commits and renders per-release changelog entries.

pub mod builder;
pub mod classifier;
pub mod fetcher;
pub mod formatter;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod mock;

pub use builder::EntryBuilder;
pub use classifier::{Classification, Classifier};
pub use fetcher::{FetchStrategy, RangeFetcher};
pub use formatter::{ChangelogFormatter, MarkdownFormatter};
pub use resolver::{RefResolver, ResolvedBoundary, ResolvedTag};
pub use types::{
    Boundary, ChangelogEntry, ChangelogSummary, ClassifiedCommit, RefTarget, ReleaseOrTag,
    EMPTY_TREE_SHA,
};
