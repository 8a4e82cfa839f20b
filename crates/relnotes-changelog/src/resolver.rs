//! Ref resolution
//!
//! Turns tag names and release records into commit hashes, and finds the
//! repository's earliest commit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use relnotes_core::ChangelogError;
use relnotes_host::{HostClient, ListCommitsOptions};
use tracing::{debug, instrument, warn};

use crate::types::{is_full_sha, Boundary, RefTarget, ReleaseOrTag};

/// A tag resolved to the commit it marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTag {
    /// Commit hash
    pub commit_sha: String,
    /// Tagger date, for annotated tags
    pub tagged_at: Option<DateTime<Utc>>,
}

/// A release or tag resolved to a boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBoundary {
    pub boundary: Boundary,
    /// Tagger date, for annotated tags
    pub tagged_at: Option<DateTime<Utc>>,
}

/// Resolves refs against a host
#[derive(Clone)]
pub struct RefResolver {
    host: Arc<dyn HostClient>,
}

impl RefResolver {
    /// Create a resolver
    pub fn new(host: Arc<dyn HostClient>) -> Self {
        Self { host }
    }

    /// Resolve a tag to a commit.
    ///
    /// Annotated tags are dereferenced to their target. If the tag object
    /// cannot be read, the ref's own hash is used.
    #[instrument(skip(self))]
    pub async fn resolve_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<ResolvedTag, ChangelogError> {
        let not_found = || ChangelogError::RefNotFound {
            tag: tag.to_string(),
        };

        let object = self
            .host
            .get_ref(owner, repo, &format!("tags/{}", tag))
            .await
            .map_err(|e| {
                debug!(error = %e, "tag ref lookup failed");
                not_found()
            })?;

        if object.sha.is_empty() {
            return Err(not_found());
        }

        if !object.is_annotated_tag() {
            return Ok(ResolvedTag {
                commit_sha: object.sha,
                tagged_at: None,
            });
        }

        match self.host.get_tag_object(owner, repo, &object.sha).await {
            Ok(tag_object) if !tag_object.target_sha.is_empty() => Ok(ResolvedTag {
                commit_sha: tag_object.target_sha,
                tagged_at: tag_object.tagger_date,
            }),
            Ok(_) => {
                warn!("annotated tag has no target, using tag object hash");
                Ok(ResolvedTag {
                    commit_sha: object.sha,
                    tagged_at: None,
                })
            }
            Err(e) => {
                warn!(error = %e, "failed to read annotated tag, using tag object hash");
                Ok(ResolvedTag {
                    commit_sha: object.sha,
                    tagged_at: None,
                })
            }
        }
    }

    /// Resolve a tag to its commit hash
    pub async fn resolve_tag_sha(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<String, ChangelogError> {
        Ok(self.resolve_tag(owner, repo, tag).await?.commit_sha)
    }

    /// Find the earliest commit reachable from the default branch.
    ///
    /// Lists one commit per page and jumps to the last page, so the cost is
    /// two requests regardless of history length.
    #[instrument(skip(self))]
    pub async fn resolve_repository_origin(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<String, ChangelogError> {
        let info = self
            .host
            .get_repository(owner, repo)
            .await
            .map_err(|e| ChangelogError::OriginNotFound(e.to_string()))?;

        let branch = info
            .default_branch
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ChangelogError::OriginNotFound("no default branch".to_string()))?;

        let options = ListCommitsOptions::from_ref(branch, 1);
        let first_page = self
            .host
            .list_commits(owner, repo, &options)
            .await
            .map_err(|e| ChangelogError::OriginNotFound(e.to_string()))?;

        let page = match first_page.last_page {
            Some(last) if last > 1 => {
                debug!(last_page = last, "fetching last page of history");
                self.host
                    .list_commits(owner, repo, &options.page(last))
                    .await
                    .map_err(|e| ChangelogError::OriginNotFound(e.to_string()))?
            }
            _ => first_page,
        };

        page.commits
            .last()
            .map(|c| c.sha.clone())
            .filter(|sha| !sha.is_empty())
            .ok_or_else(|| ChangelogError::OriginNotFound("repository has no commits".to_string()))
    }

    /// Resolve a release or tag to a boundary.
    ///
    /// A release pinned to a full commit hash is used as-is. Otherwise the
    /// tag is looked up, falling back to any hash the listing reported.
    #[instrument(skip(self, item), fields(tag = %item.tag_name))]
    pub async fn resolve_boundary(
        &self,
        owner: &str,
        repo: &str,
        item: &ReleaseOrTag,
    ) -> Result<ResolvedBoundary, ChangelogError> {
        if let RefTarget::Release {
            target_commitish: Some(target),
        } = &item.target
        {
            if is_full_sha(target) {
                return Ok(ResolvedBoundary {
                    boundary: Boundary {
                        name: item.tag_name.clone(),
                        commit_sha: target.clone(),
                        is_tag: false,
                    },
                    tagged_at: None,
                });
            }
        }

        match self.resolve_tag(owner, repo, &item.tag_name).await {
            Ok(resolved) => Ok(ResolvedBoundary {
                boundary: Boundary::tag(&item.tag_name, resolved.commit_sha),
                tagged_at: resolved.tagged_at,
            }),
            Err(e) => match item.known_sha() {
                Some(sha) => {
                    debug!(sha, "tag lookup failed, using listed commit");
                    Ok(ResolvedBoundary {
                        boundary: Boundary::tag(&item.tag_name, sha),
                        tagged_at: None,
                    })
                }
                None => Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{sha, MockHost};
    use chrono::TimeZone;
    use relnotes_host::RawCommit;

    #[tokio::test]
    async fn test_lightweight_tag() {
        let host = MockHost::new().with_lightweight_tag("v1.0.0", &sha(1));
        let resolver = RefResolver::new(Arc::new(host));

        let resolved = resolver.resolve_tag("o", "r", "v1.0.0").await.unwrap();
        assert_eq!(resolved.commit_sha, sha(1));
        assert_eq!(resolved.tagged_at, None);
    }

    #[tokio::test]
    async fn test_annotated_tag_is_dereferenced() {
        let tagged_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let host =
            MockHost::new().with_annotated_tag("v1.0.0", &sha(90), &sha(1), Some(tagged_at));
        let host = Arc::new(host);
        let resolver = RefResolver::new(host.clone());

        let resolved = resolver.resolve_tag("o", "r", "v1.0.0").await.unwrap();
        assert_eq!(resolved.commit_sha, sha(1));
        assert_eq!(resolved.tagged_at, Some(tagged_at));
        assert_eq!(host.calls("get_tag_object"), 1);
    }

    #[tokio::test]
    async fn test_unreadable_tag_object_uses_ref_hash() {
        let host = MockHost::new().with_ref("tags/v1.0.0", &sha(90), "tag");
        let resolver = RefResolver::new(Arc::new(host));

        let resolved = resolver.resolve_tag("o", "r", "v1.0.0").await.unwrap();
        assert_eq!(resolved.commit_sha, sha(90));
    }

    #[tokio::test]
    async fn test_missing_tag() {
        let resolver = RefResolver::new(Arc::new(MockHost::new()));

        let err = resolver.resolve_tag_sha("o", "r", "v9.9.9").await.unwrap_err();
        assert!(matches!(err, ChangelogError::RefNotFound { ref tag } if tag == "v9.9.9"));
    }

    #[tokio::test]
    async fn test_ref_without_hash_is_not_found() {
        let host = MockHost::new().with_ref("tags/v1.0.0", "", "commit");
        let resolver = RefResolver::new(Arc::new(host));

        let err = resolver.resolve_tag("o", "r", "v1.0.0").await.unwrap_err();
        assert!(matches!(err, ChangelogError::RefNotFound { .. }));
    }

    #[tokio::test]
    async fn test_origin_jumps_to_last_page() {
        let history = vec![
            RawCommit::new(sha(3), "third"),
            RawCommit::new(sha(2), "second"),
            RawCommit::new(sha(1), "first"),
        ];
        // per_page = 1 makes each commit its own page
        let host = MockHost::new()
            .with_default_branch("main")
            .with_listing("main", history);
        let host = Arc::new(host);
        let resolver = RefResolver::new(host.clone());

        let origin = resolver.resolve_repository_origin("o", "r").await.unwrap();
        assert_eq!(origin, sha(1));
        assert_eq!(host.calls("list_commits"), 2);
    }

    #[tokio::test]
    async fn test_origin_of_single_commit_repository() {
        let host = MockHost::new()
            .with_default_branch("main")
            .with_listing("main", vec![RawCommit::new(sha(1), "initial")]);
        let host = Arc::new(host);
        let resolver = RefResolver::new(host.clone());

        let origin = resolver.resolve_repository_origin("o", "r").await.unwrap();
        assert_eq!(origin, sha(1));
        assert_eq!(host.calls("list_commits"), 1);
    }

    #[tokio::test]
    async fn test_origin_of_empty_repository() {
        let host = MockHost::new()
            .with_default_branch("main")
            .with_listing("main", Vec::new());
        let resolver = RefResolver::new(Arc::new(host));

        let err = resolver.resolve_repository_origin("o", "r").await.unwrap_err();
        assert!(matches!(err, ChangelogError::OriginNotFound(_)));
    }

    #[tokio::test]
    async fn test_origin_without_repository() {
        let resolver = RefResolver::new(Arc::new(MockHost::new()));

        let err = resolver.resolve_repository_origin("o", "r").await.unwrap_err();
        assert!(matches!(err, ChangelogError::OriginNotFound(_)));
    }

    #[tokio::test]
    async fn test_boundary_from_pinned_release_skips_lookup() {
        let host = Arc::new(MockHost::new());
        let resolver = RefResolver::new(host.clone());
        let item = ReleaseOrTag::release("v1.0.0").with_target_commitish(sha(5));

        let resolved = resolver.resolve_boundary("o", "r", &item).await.unwrap();
        assert_eq!(resolved.boundary.commit_sha, sha(5));
        assert_eq!(resolved.boundary.name, "v1.0.0");
        assert_eq!(host.calls("get_ref"), 0);
    }

    #[tokio::test]
    async fn test_boundary_from_branch_release_looks_up_tag() {
        let host = MockHost::new().with_lightweight_tag("v1.0.0", &sha(7));
        let resolver = RefResolver::new(Arc::new(host));
        let item = ReleaseOrTag::release("v1.0.0").with_target_commitish("main");

        let resolved = resolver.resolve_boundary("o", "r", &item).await.unwrap();
        assert_eq!(resolved.boundary, Boundary::tag("v1.0.0", sha(7)));
    }

    #[tokio::test]
    async fn test_boundary_falls_back_to_listed_hash() {
        let resolver = RefResolver::new(Arc::new(MockHost::new()));
        let item = ReleaseOrTag::tag("v1.0.0", Some(sha(8)));

        let resolved = resolver.resolve_boundary("o", "r", &item).await.unwrap();
        assert_eq!(resolved.boundary.commit_sha, sha(8));
    }

    #[tokio::test]
    async fn test_boundary_unresolvable() {
        let resolver = RefResolver::new(Arc::new(MockHost::new()));
        let item = ReleaseOrTag::release("v1.0.0").with_target_commitish("main");

        let err = resolver.resolve_boundary("o", "r", &item).await.unwrap_err();
        assert!(matches!(err, ChangelogError::RefNotFound { .. }));
    }
}
