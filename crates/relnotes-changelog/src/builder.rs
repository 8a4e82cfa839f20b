//! Changelog entry building
//!
//! Ties resolution, range fetching, classification and formatting together
//! for one release at a time, and schedules a whole release list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use relnotes_core::config::{Config, PipelineConfig};
use relnotes_core::{CancelFlag, ChangelogError, ConfigError};
use relnotes_host::{HostClient, RawCommit};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use crate::classifier::Classifier;
use crate::fetcher::RangeFetcher;
use crate::formatter::{ChangelogFormatter, MarkdownFormatter};
use crate::resolver::RefResolver;
use crate::types::{Boundary, ChangelogEntry, ChangelogSummary, ReleaseOrTag};

/// Commits fetched for one entry, with what is known about the head
struct FetchedRange {
    head: Boundary,
    tagged_at: Option<DateTime<Utc>>,
    commits: Vec<RawCommit>,
}

/// Builds changelog entries against a host
#[derive(Clone)]
pub struct EntryBuilder {
    host: Arc<dyn HostClient>,
    resolver: RefResolver,
    fetcher: RangeFetcher,
    classifier: Arc<Classifier>,
    formatter: Arc<dyn ChangelogFormatter>,
    pipeline: PipelineConfig,
}

impl EntryBuilder {
    /// Create a builder from configuration
    pub fn new(host: Arc<dyn HostClient>, config: &Config) -> Result<Self, ConfigError> {
        let classifier = Classifier::new(&config.changelog)?;

        Ok(Self {
            resolver: RefResolver::new(host.clone()),
            fetcher: RangeFetcher::new(host.clone(), config.pipeline.per_page),
            classifier: Arc::new(classifier),
            formatter: Arc::new(MarkdownFormatter::from_config(&config.changelog)),
            pipeline: config.pipeline.clone(),
            host,
        })
    }

    /// Use a custom formatter
    pub fn with_formatter<F: ChangelogFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Use a custom range fetcher
    pub fn with_fetcher(mut self, fetcher: RangeFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Build the entry for `current`, with `previous` as the older boundary.
    ///
    /// Never fails: when commit history cannot be retrieved the entry carries
    /// the host-supplied body and an `error` diagnostic instead.
    #[instrument(
        skip(self, current, previous, cancel),
        fields(version = %current.tag_name, previous = ?previous.map(|p| &p.tag_name))
    )]
    pub async fn build_entry(
        &self,
        owner: &str,
        repo: &str,
        current: &ReleaseOrTag,
        previous: Option<&ReleaseOrTag>,
        is_latest: bool,
        cancel: &CancelFlag,
    ) -> ChangelogEntry {
        match self.fetch(owner, repo, current, previous, cancel).await {
            Ok(range) => self.entry_from_range(owner, repo, current, is_latest, range),
            Err(e) => {
                warn!(error = %e, "failed to build changelog entry");
                self.failed_entry(owner, repo, current, is_latest, &e.to_string())
            }
        }
    }

    /// Build entries for a newest-first list of releases or tags.
    ///
    /// Each item's previous boundary is the next item in the list. Entries are
    /// built concurrently up to the configured limit and returned in input
    /// order. Fails only when the host rejects the repository itself.
    #[instrument(skip(self, items, cancel), fields(item_count = items.len()))]
    pub async fn build_changelog(
        &self,
        owner: &str,
        repo: &str,
        items: &[ReleaseOrTag],
        cancel: &CancelFlag,
    ) -> Result<Vec<ChangelogEntry>, ChangelogError> {
        match self.host.get_repository(owner, repo).await {
            Ok(info) => debug!(repository = %info.full_name, "repository reachable"),
            Err(e) if e.is_repository_fatal() => {
                return Err(ChangelogError::RepositoryUnavailable {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(e) => warn!(error = %e, "repository lookup failed, continuing"),
        }

        info!(
            owner,
            repo,
            item_count = items.len(),
            concurrency = self.pipeline.concurrency,
            "building changelog"
        );

        let semaphore = Arc::new(Semaphore::new(self.pipeline.concurrency.max(1)));
        let mut handles = Vec::with_capacity(items.len());

        for (index, current) in items.iter().enumerate() {
            let builder = self.clone();
            let semaphore = semaphore.clone();
            let owner = owner.to_string();
            let repo = repo.to_string();
            let current = current.clone();
            let previous = items.get(index + 1).cloned();
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                builder
                    .build_entry(
                        &owner,
                        &repo,
                        &current,
                        previous.as_ref(),
                        index == 0,
                        &cancel,
                    )
                    .await
            }));
        }

        let mut entries = Vec::with_capacity(items.len());
        for (index, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(version = %items[index].tag_name, error = %e, "entry task failed");
                    entries.push(self.failed_entry(
                        owner,
                        repo,
                        &items[index],
                        index == 0,
                        &format!("entry task failed: {}", e),
                    ));
                }
            }
        }

        let failed = entries.iter().filter(|e| e.is_failed()).count();
        info!(entry_count = entries.len(), failed, "changelog built");

        Ok(entries)
    }

    async fn fetch(
        &self,
        owner: &str,
        repo: &str,
        current: &ReleaseOrTag,
        previous: Option<&ReleaseOrTag>,
        cancel: &CancelFlag,
    ) -> Result<FetchedRange, ChangelogError> {
        if cancel.is_cancelled() {
            return Err(ChangelogError::RangeUnavailable {
                head: current.tag_name.clone(),
                reason: "cancelled".to_string(),
            });
        }

        let head = self.resolver.resolve_boundary(owner, repo, current).await?;

        let base = match previous {
            Some(previous) => match self.resolver.resolve_boundary(owner, repo, previous).await {
                Ok(resolved) => Some(resolved.boundary),
                Err(e) => {
                    warn!(
                        previous = %previous.tag_name,
                        error = %e,
                        "previous boundary unresolved, widening range"
                    );
                    self.origin_boundary(owner, repo).await
                }
            },
            None => self.origin_boundary(owner, repo).await,
        };

        let commits = self
            .fetcher
            .fetch_range(owner, repo, &head.boundary, base.as_ref(), cancel)
            .await?;

        Ok(FetchedRange {
            head: head.boundary,
            tagged_at: head.tagged_at,
            commits,
        })
    }

    /// Base for the oldest item: the repository's first commit, or nothing
    async fn origin_boundary(&self, owner: &str, repo: &str) -> Option<Boundary> {
        if !self.pipeline.anchor_first_release_at_origin {
            return None;
        }

        match self.resolver.resolve_repository_origin(owner, repo).await {
            Ok(sha) => Some(Boundary::commit(sha)),
            Err(e) => {
                warn!(error = %e, "falling back to full history for first release");
                None
            }
        }
    }

    fn entry_from_range(
        &self,
        owner: &str,
        repo: &str,
        current: &ReleaseOrTag,
        is_latest: bool,
        range: FetchedRange,
    ) -> ChangelogEntry {
        let classification = self.classifier.classify(&range.commits);
        let generated = self.formatter.format(&classification.commits);

        let head_date = range
            .commits
            .iter()
            .find(|c| c.sha == range.head.commit_sha)
            .and_then(|c| c.date);

        let (formatted_body, description) = match host_body(current) {
            Some(body) => (body.to_string(), generated),
            None => (generated.clone(), generated),
        };

        ChangelogEntry {
            version: current.tag_name.clone(),
            display_name: current.display_name().to_string(),
            is_latest,
            published_at: current.published_at.or(range.tagged_at).or(head_date),
            url: self.entry_url(owner, repo, current),
            prerelease: current.prerelease,
            draft: current.draft,
            commits: classification.commits,
            summary: classification.summary,
            description,
            formatted_body,
            error: None,
        }
    }

    fn failed_entry(
        &self,
        owner: &str,
        repo: &str,
        current: &ReleaseOrTag,
        is_latest: bool,
        cause: &str,
    ) -> ChangelogEntry {
        ChangelogEntry {
            version: current.tag_name.clone(),
            display_name: current.display_name().to_string(),
            is_latest,
            published_at: current.published_at,
            url: self.entry_url(owner, repo, current),
            prerelease: current.prerelease,
            draft: current.draft,
            commits: Vec::new(),
            summary: ChangelogSummary::default(),
            description: String::new(),
            formatted_body: current.body.clone().unwrap_or_default(),
            error: Some(format!("Unable to retrieve commit history: {}", cause)),
        }
    }

    fn entry_url(&self, owner: &str, repo: &str, current: &ReleaseOrTag) -> String {
        current
            .html_url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.host.tag_url(owner, repo, &current.tag_name))
    }
}

/// Author-written body, when it has any content
fn host_body(item: &ReleaseOrTag) -> Option<&str> {
    item.body.as_deref().filter(|body| !body.trim().is_empty())
}
