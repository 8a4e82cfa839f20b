//! Host record types
//!
//! These are the typed shapes the rest of the pipeline sees. Conversion from
//! raw host JSON happens inside the client implementation, so missing or
//! null fields never leak past this boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author identity attached to a commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitAuthor {
    /// Author name from the commit object
    pub name: String,
    /// Author email from the commit object
    pub email: String,
    /// Host account login, when the email maps to an account
    pub login: Option<String>,
    /// Host account avatar
    pub avatar_url: Option<String>,
}

/// A commit as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    /// Commit hash (full)
    pub sha: String,
    /// Full commit message
    pub message: String,
    /// Author identity
    pub author: CommitAuthor,
    /// Committer date
    pub date: Option<DateTime<Utc>>,
    /// Web URL of the commit
    pub html_url: String,
}

impl RawCommit {
    /// Create a new RawCommit
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author: CommitAuthor::default(),
            date: None,
            html_url: String::new(),
        }
    }

    /// Set the author
    pub fn with_author(mut self, author: CommitAuthor) -> Self {
        self.author = author;
        self
    }

    /// Set the committer date
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the web URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.html_url = url.into();
        self
    }

    /// First line of the message, trimmed
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim()
    }
}

/// Object a git ref points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefObject {
    /// Object hash
    pub sha: String,
    /// Object type (`commit` for lightweight tags, `tag` for annotated tags)
    pub object_type: String,
}

impl RefObject {
    /// Whether the ref points at an annotated tag object
    pub fn is_annotated_tag(&self) -> bool {
        self.object_type == "tag"
    }
}

/// An annotated tag object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagObject {
    /// Tag object hash
    pub sha: String,
    /// Hash of the object the tag points at
    pub target_sha: String,
    /// When the tag was created
    pub tagger_date: Option<DateTime<Utc>>,
}

/// Repository metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    /// `owner/name`
    pub full_name: String,
    /// Default branch name
    pub default_branch: Option<String>,
}

/// Options for listing commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCommitsOptions {
    /// Ref or SHA to start listing from (host default branch when absent)
    pub sha: Option<String>,
    /// Page size
    pub per_page: u32,
    /// 1-based page number
    pub page: Option<u32>,
}

impl ListCommitsOptions {
    /// List from a ref or SHA
    pub fn from_ref(sha: impl Into<String>, per_page: u32) -> Self {
        Self {
            sha: Some(sha.into()),
            per_page,
            page: None,
        }
    }

    /// Request a specific page
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// One page of a commit listing, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPage {
    /// Commits on this page
    pub commits: Vec<RawCommit>,
    /// Number of the last page, when the host reports one
    pub last_page: Option<u32>,
}

/// Result of comparing two commits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareResult {
    /// Commits reachable from head but not from base
    pub commits: Vec<RawCommit>,
}

/// A release as published on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRelease {
    /// Tag the release is attached to
    pub tag_name: String,
    /// Release title
    pub name: Option<String>,
    /// Release notes written by the author
    pub body: Option<String>,
    /// Publication time (absent for drafts)
    pub published_at: Option<DateTime<Utc>>,
    /// Web URL of the release
    pub html_url: Option<String>,
    /// Marked as prerelease
    pub prerelease: bool,
    /// Unpublished draft
    pub draft: bool,
    /// Branch or SHA the tag was created from
    pub target_commitish: Option<String>,
}

/// A tag as listed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTag {
    /// Tag name
    pub name: String,
    /// Commit the tag points at
    pub commit_sha: Option<String>,
}
