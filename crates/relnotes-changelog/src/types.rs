//! Changelog types

use chrono::{DateTime, Utc};
use relnotes_core::Category;
use relnotes_host::{CommitAuthor, HostRelease, HostTag};
use serde::{Deserialize, Serialize};

/// Git's well-known empty tree hash.
///
/// Comparing against it yields every commit reachable from the head.
pub const EMPTY_TREE_SHA: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Whether a string is a full 40-character hexadecimal commit hash
pub fn is_full_sha(value: &str) -> bool {
    value.len() == 40 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Where a release or tag points, as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RefTarget {
    /// A published release and the branch or SHA it was cut from
    Release { target_commitish: Option<String> },
    /// A bare tag and the commit the listing reported for it
    Tag { commit_sha: Option<String> },
}

/// A release or bare tag to build a changelog entry for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOrTag {
    /// Tag name
    pub tag_name: String,
    /// Display title, when the host has one
    pub name: Option<String>,
    /// Author-written release notes
    pub body: Option<String>,
    /// Publication time
    pub published_at: Option<DateTime<Utc>>,
    /// Web URL of the release
    pub html_url: Option<String>,
    /// Marked as prerelease
    pub prerelease: bool,
    /// Unpublished draft
    pub draft: bool,
    /// What the host says the tag points at
    pub target: RefTarget,
}

impl ReleaseOrTag {
    /// A release with no metadata beyond its tag
    pub fn release(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            name: None,
            body: None,
            published_at: None,
            html_url: None,
            prerelease: false,
            draft: false,
            target: RefTarget::Release {
                target_commitish: None,
            },
        }
    }

    /// A bare tag
    pub fn tag(tag_name: impl Into<String>, commit_sha: Option<String>) -> Self {
        Self {
            target: RefTarget::Tag { commit_sha },
            ..Self::release(tag_name)
        }
    }

    /// Set the release body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the publication time
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Set the release target
    pub fn with_target_commitish(mut self, target: impl Into<String>) -> Self {
        self.target = RefTarget::Release {
            target_commitish: Some(target.into()),
        };
        self
    }

    /// Name shown to readers: the release title, falling back to the tag
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.tag_name)
    }

    /// A full commit hash known without asking the host, if any
    pub fn known_sha(&self) -> Option<&str> {
        let candidate = match &self.target {
            RefTarget::Release { target_commitish } => target_commitish.as_deref(),
            RefTarget::Tag { commit_sha } => commit_sha.as_deref(),
        };
        candidate.filter(|sha| is_full_sha(sha))
    }
}

impl From<HostRelease> for ReleaseOrTag {
    fn from(release: HostRelease) -> Self {
        Self {
            tag_name: release.tag_name,
            name: release.name,
            body: release.body,
            published_at: release.published_at,
            html_url: release.html_url,
            prerelease: release.prerelease,
            draft: release.draft,
            target: RefTarget::Release {
                target_commitish: release.target_commitish,
            },
        }
    }
}

impl From<HostTag> for ReleaseOrTag {
    fn from(tag: HostTag) -> Self {
        Self::tag(tag.name, tag.commit_sha)
    }
}

/// A named position in history, resolved to a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    /// Tag name, or empty when only the hash is known
    pub name: String,
    /// Commit hash
    pub commit_sha: String,
    /// Whether `name` is a tag on the host
    pub is_tag: bool,
}

impl Boundary {
    /// A boundary backed by a tag
    pub fn tag(name: impl Into<String>, commit_sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_sha: commit_sha.into(),
            is_tag: true,
        }
    }

    /// A boundary known only by its commit hash
    pub fn commit(commit_sha: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            commit_sha: commit_sha.into(),
            is_tag: false,
        }
    }

    /// Name used in logs and errors
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.commit_sha
        } else {
            &self.name
        }
    }
}

/// A commit after classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedCommit {
    /// Full hash
    pub sha: String,
    /// First seven characters of the hash
    pub short_sha: String,
    /// Cleaned first line of the message
    pub title: String,
    /// Unmodified message
    pub full_message: String,
    /// Committer date
    pub date: Option<DateTime<Utc>>,
    /// Author identity
    pub author: CommitAuthor,
    /// Web URL of the commit
    pub url: String,
    /// Assigned category
    pub category: Category,
}

/// Per-category commit counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogSummary {
    pub features: usize,
    pub fixes: usize,
    pub improvements: usize,
    pub docs: usize,
    pub others: usize,
    /// Number of commits classified
    pub total_commits: usize,
}

impl ChangelogSummary {
    /// Count one commit in a category
    pub fn record(&mut self, category: Category) {
        *self.slot(category) += 1;
    }

    /// Count for a category
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Feature => self.features,
            Category::Fix => self.fixes,
            Category::Improvement => self.improvements,
            Category::Docs => self.docs,
            Category::Other => self.others,
        }
    }

    fn slot(&mut self, category: Category) -> &mut usize {
        match category {
            Category::Feature => &mut self.features,
            Category::Fix => &mut self.fixes,
            Category::Improvement => &mut self.improvements,
            Category::Docs => &mut self.docs,
            Category::Other => &mut self.others,
        }
    }
}

/// A finished changelog entry for one release or tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    /// Tag name
    pub version: String,
    /// Release title or tag name
    pub display_name: String,
    /// Newest item of the build
    pub is_latest: bool,
    /// Release date, tag date or head commit date
    pub published_at: Option<DateTime<Utc>>,
    /// Release page, or tag page when there is no release
    pub url: String,
    pub prerelease: bool,
    pub draft: bool,
    /// Classified commits, grouped by category
    pub commits: Vec<ClassifiedCommit>,
    pub summary: ChangelogSummary,
    /// Generated markdown
    pub description: String,
    /// Author-written body when present, else the generated markdown
    pub formatted_body: String,
    /// Set when commit history could not be retrieved
    pub error: Option<String>,
}

impl ChangelogEntry {
    /// Whether the entry was built without commit history
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
