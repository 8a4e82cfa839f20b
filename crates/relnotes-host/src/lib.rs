//! relnotes Host - VCS host client for changelog synthesis
//!
//! This crate defines the boundary the changelog pipeline consumes: typed
//! host records, the [`HostClient`] trait, and a GitHub REST implementation.

mod client;
pub mod error;
mod github;
pub mod types;

pub use client::HostClient;
pub use error::{HostError, Result};
pub use github::GitHubClient;
pub use types::{
    CommitAuthor, CommitPage, CompareResult, HostRelease, HostTag, ListCommitsOptions, RawCommit,
    RefObject, RepositoryInfo, TagObject,
};
