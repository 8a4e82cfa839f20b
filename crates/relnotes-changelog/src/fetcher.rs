//! Commit range fetching
//!
//! Collects the commits between two boundaries. The host does not always
//! answer a given query shape, so a fixed list of strategies is tried in
//! order and the first non-empty answer wins.

use std::fmt;
use std::sync::Arc;

use relnotes_core::{CancelFlag, ChangelogError};
use relnotes_host::{HostClient, HostError, ListCommitsOptions, RawCommit};
use tracing::{debug, info, instrument, warn};

use crate::types::{Boundary, EMPTY_TREE_SHA};

/// Inputs shared by every strategy
pub struct FetchContext<'a> {
    pub host: &'a dyn HostClient,
    pub owner: &'a str,
    pub repo: &'a str,
    pub head: &'a Boundary,
    pub base: Option<&'a Boundary>,
    pub per_page: u32,
}

/// One way of asking the host for a commit range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// List history from the head's name, falling back to its hash
    RefListing,
    /// Compare base (or the empty tree) against the head hash
    RangeCompare,
    /// List history from the head hash
    ShaListing,
    /// The head commit alone
    SingleCommit,
}

impl FetchStrategy {
    /// Strategies in the order they are tried
    pub const DEFAULT_ORDER: [FetchStrategy; 4] = [
        Self::RefListing,
        Self::RangeCompare,
        Self::ShaListing,
        Self::SingleCommit,
    ];

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RefListing => "ref-listing",
            Self::RangeCompare => "range-compare",
            Self::ShaListing => "sha-listing",
            Self::SingleCommit => "single-commit",
        }
    }

    /// Ask the host for commits
    pub async fn run(&self, ctx: &FetchContext<'_>) -> Result<Vec<RawCommit>, HostError> {
        match self {
            Self::RefListing => {
                let start = ctx.head.label().to_string();
                let mut commits = ctx
                    .host
                    .list_commits(
                        ctx.owner,
                        ctx.repo,
                        &ListCommitsOptions::from_ref(start, ctx.per_page),
                    )
                    .await?
                    .commits;
                commits.truncate(ctx.per_page as usize);
                Ok(commits)
            }
            Self::RangeCompare => {
                let base = ctx
                    .base
                    .map(|b| b.commit_sha.as_str())
                    .unwrap_or(EMPTY_TREE_SHA);
                let result = ctx
                    .host
                    .compare_commits(ctx.owner, ctx.repo, base, &ctx.head.commit_sha)
                    .await?;
                Ok(result.commits)
            }
            Self::ShaListing => {
                let mut commits = ctx
                    .host
                    .list_commits(
                        ctx.owner,
                        ctx.repo,
                        &ListCommitsOptions::from_ref(ctx.head.commit_sha.clone(), ctx.per_page),
                    )
                    .await?
                    .commits;
                commits.truncate(ctx.per_page as usize);
                Ok(commits)
            }
            Self::SingleCommit => {
                let commit = ctx
                    .host
                    .get_commit(ctx.owner, ctx.repo, &ctx.head.commit_sha)
                    .await?;
                Ok(vec![commit])
            }
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetches commit ranges with ordered fallbacks
#[derive(Clone)]
pub struct RangeFetcher {
    host: Arc<dyn HostClient>,
    strategies: Vec<FetchStrategy>,
    per_page: u32,
}

impl RangeFetcher {
    /// Create a fetcher using the default strategy order
    pub fn new(host: Arc<dyn HostClient>, per_page: u32) -> Self {
        Self {
            host,
            strategies: FetchStrategy::DEFAULT_ORDER.to_vec(),
            per_page,
        }
    }

    /// Replace the strategy list
    pub fn with_strategies(mut self, strategies: Vec<FetchStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Commits between `base` and `head`.
    ///
    /// With no base, everything reachable from the head is in range. The
    /// cancel flag is checked before each strategy; once raised, no further
    /// host requests are made.
    #[instrument(
        skip(self, head, base, cancel),
        fields(head = %head.label(), base = ?base.map(|b| b.label()))
    )]
    pub async fn fetch_range(
        &self,
        owner: &str,
        repo: &str,
        head: &Boundary,
        base: Option<&Boundary>,
        cancel: &CancelFlag,
    ) -> Result<Vec<RawCommit>, ChangelogError> {
        let ctx = FetchContext {
            host: self.host.as_ref(),
            owner,
            repo,
            head,
            base,
            per_page: self.per_page,
        };

        let mut failures = Vec::new();

        for strategy in &self.strategies {
            if cancel.is_cancelled() {
                debug!(strategy = %strategy, "range fetch cancelled");
                return Err(ChangelogError::RangeUnavailable {
                    head: head.label().to_string(),
                    reason: "cancelled".to_string(),
                });
            }

            match strategy.run(&ctx).await {
                Ok(commits) if !commits.is_empty() => {
                    info!(
                        strategy = %strategy,
                        commit_count = commits.len(),
                        "commit range fetched"
                    );
                    return Ok(commits);
                }
                Ok(_) => {
                    debug!(strategy = %strategy, "strategy returned no commits");
                    failures.push(format!("{}: no commits", strategy));
                }
                Err(e) => {
                    warn!(strategy = %strategy, error = %e, "commit range strategy failed");
                    failures.push(format!("{}: {}", strategy, e));
                }
            }
        }

        if cancel.is_cancelled() {
            return Err(ChangelogError::RangeUnavailable {
                head: head.label().to_string(),
                reason: "cancelled".to_string(),
            });
        }

        Err(ChangelogError::RangeUnavailable {
            head: head.label().to_string(),
            reason: if failures.is_empty() {
                "no strategies configured".to_string()
            } else {
                failures.join("; ")
            },
        })
    }
}
