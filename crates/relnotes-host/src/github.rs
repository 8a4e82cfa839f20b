//! GitHub REST API host client
//!
//! ## Authentication
//!
//! Uses a bearer token read from the environment variable named by
//! `host.token_env` (default `GITHUB_TOKEN`). Unauthenticated requests work
//! for public repositories, with a much lower rate limit.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use relnotes_core::config::HostConfig;

use crate::client::HostClient;
use crate::error::{HostError, Result};
use crate::types::*;

const API_VERSION: &str = "2022-11-28";

/// GitHub implementation of [`HostClient`]
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    web_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client, reading the token from the configured env var
    pub fn new(config: &HostConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_some() {
            debug!(token_env = %config.token_env, "loaded host token from environment");
        }
        Self::with_token(config, token)
    }

    /// Create a client with an explicit token
    pub fn with_token(config: &HostConfig, token: Option<String>) -> Result<Self> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            HostError::Configuration(format!("invalid api_url '{}': {}", config.api_url, e))
        })?;
        if api_url.cannot_be_a_base() {
            return Err(HostError::Configuration(format!(
                "api_url '{}' cannot be used as a base URL",
                config.api_url
            )));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url,
            web_url: config.web_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build `{api_url}/repos/{owner}/{repo}/{segments...}` with each segment encoded
    fn endpoint(&self, owner: &str, repo: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| HostError::Configuration("api_url cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push("repos")
            .push(owner)
            .push(repo)
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<Response> {
        debug!(url = %url, "GitHub API request");

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        check_status(response, url.path()).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.get(url).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl HostClient for GitHubClient {
    #[instrument(skip(self))]
    async fn get_ref(&self, owner: &str, repo: &str, ref_path: &str) -> Result<RefObject> {
        let mut segments = vec!["git", "ref"];
        segments.extend(ref_path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(owner, repo, &segments)?;

        let wire: WireRef = self.get_json(url).await?;
        let object = wire.object.unwrap_or_default();
        Ok(RefObject {
            sha: object.sha.unwrap_or_default(),
            object_type: object.kind.unwrap_or_default(),
        })
    }

    #[instrument(skip(self))]
    async fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<RawCommit> {
        let url = self.endpoint(owner, repo, &["commits", sha])?;
        let wire: WireCommit = self.get_json(url).await?;
        Ok(wire.into())
    }

    #[instrument(skip(self))]
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        options: &ListCommitsOptions,
    ) -> Result<CommitPage> {
        let mut url = self.endpoint(owner, repo, &["commits"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(sha) = &options.sha {
                query.append_pair("sha", sha);
            }
            query.append_pair("per_page", &options.per_page.to_string());
            if let Some(page) = options.page {
                query.append_pair("page", &page.to_string());
            }
        }

        let response = self.get(url).await?;
        let last_page = last_page(response.headers());
        let wire: Vec<WireCommit> = response.json().await?;

        debug!(count = wire.len(), ?last_page, "listed commits");
        Ok(CommitPage {
            commits: wire.into_iter().map(RawCommit::from).collect(),
            last_page,
        })
    }

    #[instrument(skip(self))]
    async fn compare_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<CompareResult> {
        let range = format!("{}...{}", base, head);
        let url = self.endpoint(owner, repo, &["compare", &range])?;

        let wire: WireCompare = self.get_json(url).await?;
        let commits: Vec<RawCommit> = wire
            .commits
            .unwrap_or_default()
            .into_iter()
            .map(RawCommit::from)
            .collect();

        debug!(count = commits.len(), "compared commits");
        Ok(CompareResult { commits })
    }

    #[instrument(skip(self))]
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo> {
        let url = self.endpoint(owner, repo, &[])?;
        let wire: WireRepository = self.get_json(url).await?;
        Ok(RepositoryInfo {
            full_name: wire
                .full_name
                .unwrap_or_else(|| format!("{}/{}", owner, repo)),
            default_branch: wire.default_branch.filter(|b| !b.is_empty()),
        })
    }

    #[instrument(skip(self))]
    async fn get_tag_object(&self, owner: &str, repo: &str, tag_sha: &str) -> Result<TagObject> {
        let url = self.endpoint(owner, repo, &["git", "tags", tag_sha])?;
        let wire: WireTagObject = self.get_json(url).await?;

        let target_sha = wire
            .object
            .and_then(|o| o.sha)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                HostError::InvalidResponse(format!("tag object {} has no target", tag_sha))
            })?;

        Ok(TagObject {
            sha: wire.sha.unwrap_or_else(|| tag_sha.to_string()),
            target_sha,
            tagger_date: wire.tagger.and_then(|t| parse_date(t.date.as_deref())),
        })
    }

    #[instrument(skip(self))]
    async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<Vec<HostRelease>> {
        let mut url = self.endpoint(owner, repo, &["releases"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.to_string());

        let wire: Vec<WireRelease> = self.get_json(url).await?;
        let releases: Vec<HostRelease> = wire.into_iter().filter_map(WireRelease::into_release).collect();

        debug!(count = releases.len(), "listed releases");
        Ok(releases)
    }

    #[instrument(skip(self))]
    async fn list_tags(&self, owner: &str, repo: &str, per_page: u32) -> Result<Vec<HostTag>> {
        let mut url = self.endpoint(owner, repo, &["tags"])?;
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.to_string());

        let wire: Vec<WireTag> = self.get_json(url).await?;
        let tags: Vec<HostTag> = wire
            .into_iter()
            .filter_map(|t| {
                let name = t.name.filter(|n| !n.is_empty())?;
                Some(HostTag {
                    name,
                    commit_sha: t.commit.and_then(|c| c.sha).filter(|s| !s.is_empty()),
                })
            })
            .collect();

        debug!(count = tags.len(), "listed tags");
        Ok(tags)
    }

    fn tag_url(&self, owner: &str, repo: &str, tag: &str) -> String {
        format!("{}/{}/{}/releases/tag/{}", self.web_url, owner, repo, tag)
    }
}

/// Map a non-success response to a [`HostError`]
async fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Secondary rate limits answer 403 with retry-after and no remaining count
    let remaining = header_u64(response.headers(), "x-ratelimit-remaining");
    let retry_after = response.headers().contains_key("retry-after");
    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && (remaining == Some(0) || retry_after))
    {
        return Err(HostError::RateLimited {
            reset: header_u64(response.headers(), "x-ratelimit-reset"),
        });
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<WireError>(&text)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or(text);

    Err(match status {
        StatusCode::NOT_FOUND => HostError::NotFound(path.to_string()),
        StatusCode::UNAUTHORIZED => HostError::Unauthorized(message),
        StatusCode::FORBIDDEN => HostError::Forbidden(message),
        _ => HostError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Extract the `page` query value of the `rel="last"` link
fn last_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.contains("rel=\"last\"") {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value?)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireError {
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireObject {
    sha: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRef {
    object: Option<WireObject>,
}

#[derive(Debug, Deserialize)]
struct WireSignature {
    name: Option<String>,
    email: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAccount {
    login: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCommitDetail {
    message: Option<String>,
    author: Option<WireSignature>,
    committer: Option<WireSignature>,
}

#[derive(Debug, Deserialize)]
struct WireCommit {
    sha: Option<String>,
    html_url: Option<String>,
    commit: Option<WireCommitDetail>,
    author: Option<WireAccount>,
}

impl From<WireCommit> for RawCommit {
    fn from(wire: WireCommit) -> Self {
        let (message, signature, committer) = match wire.commit {
            Some(detail) => (detail.message, detail.author, detail.committer),
            None => (None, None, None),
        };

        let date = parse_date(committer.as_ref().and_then(|c| c.date.as_deref()))
            .or_else(|| parse_date(signature.as_ref().and_then(|s| s.date.as_deref())));

        let (name, email) = match signature {
            Some(s) => (s.name.unwrap_or_default(), s.email.unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        let (login, avatar_url) = match wire.author {
            Some(a) => (a.login, a.avatar_url),
            None => (None, None),
        };

        Self {
            sha: wire.sha.unwrap_or_default(),
            message: message.unwrap_or_default(),
            author: CommitAuthor {
                name,
                email,
                login,
                avatar_url,
            },
            date,
            html_url: wire.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCompare {
    commits: Option<Vec<WireCommit>>,
}

#[derive(Debug, Deserialize)]
struct WireRepository {
    full_name: Option<String>,
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTagger {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireTagObject {
    sha: Option<String>,
    object: Option<WireObject>,
    tagger: Option<WireTagger>,
}

#[derive(Debug, Deserialize)]
struct WireRelease {
    tag_name: Option<String>,
    name: Option<String>,
    body: Option<String>,
    published_at: Option<String>,
    html_url: Option<String>,
    prerelease: Option<bool>,
    draft: Option<bool>,
    target_commitish: Option<String>,
}

impl WireRelease {
    fn into_release(self) -> Option<HostRelease> {
        let tag_name = self.tag_name.filter(|t| !t.is_empty())?;
        Some(HostRelease {
            tag_name,
            name: self.name.filter(|n| !n.is_empty()),
            body: self.body,
            published_at: parse_date(self.published_at.as_deref()),
            html_url: self.html_url,
            prerelease: self.prerelease.unwrap_or(false),
            draft: self.draft.unwrap_or(false),
            target_commitish: self.target_commitish.filter(|t| !t.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WireTag {
    name: Option<String>,
    commit: Option<WireObject>,
}
