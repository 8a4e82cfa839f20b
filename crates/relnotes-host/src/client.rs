//! Host client trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::*;

/// Operations the changelog pipeline needs from a VCS host.
///
/// Implementations own timeouts, retries and rate limiting. Every method is
/// a single request from the caller's point of view.
#[async_trait]
pub trait HostClient: Send + Sync {
    /// Look up a ref such as `tags/v1.0.0`
    async fn get_ref(&self, owner: &str, repo: &str, ref_path: &str) -> Result<RefObject>;

    /// Fetch a single commit
    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<RawCommit>;

    /// List commits reachable from a ref, newest first
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        options: &ListCommitsOptions,
    ) -> Result<CommitPage>;

    /// Commits reachable from `head` but not from `base`
    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<CompareResult>;

    /// Repository metadata
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo>;

    /// Fetch an annotated tag object
    async fn get_tag_object(&self, owner: &str, repo: &str, tag_sha: &str) -> Result<TagObject>;

    /// Published releases, newest first
    async fn list_releases(&self, owner: &str, repo: &str, per_page: u32)
        -> Result<Vec<HostRelease>>;

    /// Repository tags
    async fn list_tags(&self, owner: &str, repo: &str, per_page: u32) -> Result<Vec<HostTag>>;

    /// Web URL for a tag
    fn tag_url(&self, owner: &str, repo: &str, tag: &str) -> String;
}
