//! Scripted host for pipeline tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relnotes_core::CancelFlag;
use relnotes_host::{
    CommitPage, CompareResult, HostClient, HostError, HostRelease, HostTag, ListCommitsOptions,
    RawCommit, RefObject, RepositoryInfo, TagObject,
};

/// A 40-character hash derived from `n`
pub(crate) fn sha(n: u32) -> String {
    format!("{:040x}", n)
}

/// Host answering from in-memory tables. Anything not scripted is a 404.
#[derive(Default)]
pub(crate) struct MockHost {
    refs: HashMap<String, RefObject>,
    tag_objects: HashMap<String, TagObject>,
    commits: HashMap<String, RawCommit>,
    listings: HashMap<String, Vec<RawCommit>>,
    compares: HashMap<(String, String), Vec<RawCommit>>,
    repository: Option<RepositoryInfo>,
    repository_error: Option<fn() -> HostError>,
    cancel_on: Option<(&'static str, CancelFlag)>,
    delay: Option<Duration>,
    calls: Mutex<Vec<&'static str>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_ref(mut self, path: &str, sha: &str, object_type: &str) -> Self {
        self.refs.insert(
            path.to_string(),
            RefObject {
                sha: sha.to_string(),
                object_type: object_type.to_string(),
            },
        );
        self
    }

    pub(crate) fn with_lightweight_tag(self, tag: &str, commit_sha: &str) -> Self {
        self.with_ref(&format!("tags/{}", tag), commit_sha, "commit")
    }

    pub(crate) fn with_annotated_tag(
        mut self,
        tag: &str,
        tag_sha: &str,
        commit_sha: &str,
        tagger_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.tag_objects.insert(
            tag_sha.to_string(),
            TagObject {
                sha: tag_sha.to_string(),
                target_sha: commit_sha.to_string(),
                tagger_date,
            },
        );
        self.with_ref(&format!("tags/{}", tag), tag_sha, "tag")
    }

    pub(crate) fn with_commit(mut self, commit: RawCommit) -> Self {
        self.commits.insert(commit.sha.clone(), commit);
        self
    }

    /// Newest-first history reachable from `key` (a ref name or hash)
    pub(crate) fn with_listing(mut self, key: &str, commits: Vec<RawCommit>) -> Self {
        self.listings.insert(key.to_string(), commits);
        self
    }

    pub(crate) fn with_compare(mut self, base: &str, head: &str, commits: Vec<RawCommit>) -> Self {
        self.compares
            .insert((base.to_string(), head.to_string()), commits);
        self
    }

    pub(crate) fn with_default_branch(mut self, branch: &str) -> Self {
        self.repository = Some(RepositoryInfo {
            full_name: "o/r".to_string(),
            default_branch: Some(branch.to_string()),
        });
        self
    }

    pub(crate) fn with_repository_error(mut self, error: fn() -> HostError) -> Self {
        self.repository_error = Some(error);
        self
    }

    /// Raise `flag` when `method` is called
    pub(crate) fn cancel_on(mut self, method: &'static str, flag: CancelFlag) -> Self {
        self.cancel_on = Some((method, flag));
        self
    }

    /// Make compare requests take `delay`
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made to `method`
    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|m| **m == method)
            .count()
    }

    /// Highest number of compare requests seen at once
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
        if let Some((trigger, flag)) = &self.cancel_on {
            if *trigger == method {
                flag.cancel();
            }
        }
    }
}

#[async_trait]
impl HostClient for MockHost {
    async fn get_ref(
        &self,
        _owner: &str,
        _repo: &str,
        ref_path: &str,
    ) -> relnotes_host::Result<RefObject> {
        self.record("get_ref");
        self.refs
            .get(ref_path)
            .cloned()
            .ok_or_else(|| HostError::NotFound(ref_path.to_string()))
    }

    async fn get_commit(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
    ) -> relnotes_host::Result<RawCommit> {
        self.record("get_commit");
        self.commits
            .get(sha)
            .cloned()
            .ok_or_else(|| HostError::NotFound(sha.to_string()))
    }

    async fn list_commits(
        &self,
        _owner: &str,
        _repo: &str,
        options: &ListCommitsOptions,
    ) -> relnotes_host::Result<CommitPage> {
        self.record("list_commits");
        let key = options.sha.as_deref().unwrap_or("HEAD");
        let all = self
            .listings
            .get(key)
            .ok_or_else(|| HostError::NotFound(key.to_string()))?;

        let per_page = options.per_page.max(1) as usize;
        let pages: Vec<&[RawCommit]> = all.chunks(per_page).collect();
        let page = options.page.unwrap_or(1).max(1) as usize;

        Ok(CommitPage {
            commits: pages.get(page - 1).map(|p| p.to_vec()).unwrap_or_default(),
            last_page: (pages.len() > 1).then_some(pages.len() as u32),
        })
    }

    async fn compare_commits(
        &self,
        _owner: &str,
        _repo: &str,
        base: &str,
        head: &str,
    ) -> relnotes_host::Result<CompareResult> {
        self.record("compare_commits");

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.compares
            .get(&(base.to_string(), head.to_string()))
            .cloned()
            .map(|commits| CompareResult { commits })
            .ok_or_else(|| HostError::NotFound(format!("{}...{}", base, head)))
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> relnotes_host::Result<RepositoryInfo> {
        self.record("get_repository");
        if let Some(error) = self.repository_error {
            return Err(error());
        }
        self.repository
            .clone()
            .ok_or_else(|| HostError::NotFound(format!("{}/{}", owner, repo)))
    }

    async fn get_tag_object(
        &self,
        _owner: &str,
        _repo: &str,
        tag_sha: &str,
    ) -> relnotes_host::Result<TagObject> {
        self.record("get_tag_object");
        self.tag_objects
            .get(tag_sha)
            .cloned()
            .ok_or_else(|| HostError::NotFound(tag_sha.to_string()))
    }

    async fn list_releases(
        &self,
        _owner: &str,
        _repo: &str,
        _per_page: u32,
    ) -> relnotes_host::Result<Vec<HostRelease>> {
        self.record("list_releases");
        Ok(Vec::new())
    }

    async fn list_tags(
        &self,
        _owner: &str,
        _repo: &str,
        _per_page: u32,
    ) -> relnotes_host::Result<Vec<HostTag>> {
        self.record("list_tags");
        Ok(Vec::new())
    }

    fn tag_url(&self, owner: &str, repo: &str, tag: &str) -> String {
        format!("https://github.com/{}/{}/releases/tag/{}", owner, repo, tag)
    }
}
