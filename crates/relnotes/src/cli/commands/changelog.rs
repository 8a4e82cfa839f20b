//! Changelog command

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use tracing::{debug, info, warn};

use relnotes_changelog::{ChangelogEntry, EntryBuilder, ReleaseOrTag};
use relnotes_core::config::{load_config_or_default, Config};
use relnotes_core::{CancelFlag, ChangelogError};
use relnotes_host::{GitHubClient, HostClient, HostRelease, HostTag};

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Build changelog entries for a repository's releases or tags
#[derive(Debug, Args)]
pub struct ChangelogCommand {
    /// Repository as OWNER/REPO
    #[arg(value_name = "OWNER/REPO")]
    pub repository: String,

    /// Where release boundaries come from
    #[arg(long, value_enum, default_value = "releases")]
    pub source: Source,

    /// Maximum number of entries to build
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    /// Include draft releases
    #[arg(long)]
    pub include_drafts: bool,

    /// Write to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Source of release boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Published releases, newest first
    Releases,
    /// Tags, ordered by semantic version
    Tags,
}

impl ChangelogCommand {
    /// Execute the changelog command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            repository = %self.repository,
            source = ?self.source,
            limit = self.limit,
            "executing changelog command"
        );
        let (owner, repo) = parse_repository(&self.repository)?;

        let cwd = std::env::current_dir()?;
        let config = match load_config_or_default(&cwd) {
            Ok((config, path)) => {
                debug!(config_path = ?path, "configuration loaded");
                config
            }
            Err(e) => {
                output::error(&e.to_string());
                std::process::exit(exit_codes::CONFIG_ERROR);
            }
        };

        let rt = tokio::runtime::Runtime::new()?;
        let entries = match rt.block_on(self.build(&config, owner, repo)) {
            Ok(entries) => entries,
            Err(e) => match e.downcast_ref::<ChangelogError>() {
                Some(ChangelogError::RepositoryUnavailable { .. }) => {
                    output::error(&e.to_string());
                    std::process::exit(exit_codes::HOST_ERROR);
                }
                _ => return Err(e),
            },
        };

        if entries.is_empty() {
            if !cli.quiet {
                output::warning(&format!("No {} found for {}/{}", self.source_noun(), owner, repo));
            }
            return Ok(());
        }

        if !cli.quiet {
            for entry in entries.iter().filter(|e| e.is_failed()) {
                output::warning(&format!(
                    "{}: {}",
                    output::tag_style().apply_to(&entry.version),
                    entry.error.as_deref().unwrap_or_default()
                ));
            }
        }

        let rendered = match cli.format {
            OutputFormat::Json => serde_json::to_string_pretty(&entries)?,
            OutputFormat::Text => render_markdown(&entries),
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, format!("{}\n", rendered))?;
                if !cli.quiet {
                    output::success(&format!(
                        "Changelog with {} entries written to {}",
                        entries.len(),
                        output::path_style().apply_to(path.display())
                    ));
                }
            }
            None => println!("{}", rendered),
        }

        if entries.iter().all(|e| e.is_failed()) {
            std::process::exit(exit_codes::ERROR);
        }

        Ok(())
    }

    async fn build(
        &self,
        config: &Config,
        owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<ChangelogEntry>> {
        let host: Arc<dyn HostClient> = Arc::new(GitHubClient::new(&config.host)?);
        let per_page = config.pipeline.per_page;

        let items = match self.source {
            Source::Releases => select_releases(
                host.list_releases(owner, repo, per_page).await?,
                self.include_drafts,
            ),
            Source::Tags => sort_tags_newest_first(host.list_tags(owner, repo, per_page).await?),
        };

        // One extra item supplies the previous boundary of the oldest entry
        let items: Vec<ReleaseOrTag> = items.into_iter().take(self.limit + 1).collect();
        if items.is_empty() || self.limit == 0 {
            return Ok(Vec::new());
        }

        let builder = EntryBuilder::new(host, config)?;
        let cancel = CancelFlag::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling changelog build");
                    cancel.cancel();
                }
            })
        };

        let result = builder.build_changelog(owner, repo, &items, &cancel).await;
        watcher.abort();

        let mut entries = result?;
        entries.truncate(self.limit);
        Ok(entries)
    }

    fn source_noun(&self) -> &'static str {
        match self.source {
            Source::Releases => "releases",
            Source::Tags => "semver tags",
        }
    }
}

/// Split `owner/repo`, tolerating a trailing `.git`
fn parse_repository(value: &str) -> anyhow::Result<(&str, &str)> {
    let trimmed = value.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

    match trimmed.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => anyhow::bail!("Invalid repository '{}', expected OWNER/REPO", value),
    }
}

/// Releases in host order, drafts removed unless requested
fn select_releases(releases: Vec<HostRelease>, include_drafts: bool) -> Vec<ReleaseOrTag> {
    releases
        .into_iter()
        .filter(|r| include_drafts || !r.draft)
        .map(ReleaseOrTag::from)
        .collect()
}

/// Tags that parse as semantic versions, highest first
fn sort_tags_newest_first(tags: Vec<HostTag>) -> Vec<ReleaseOrTag> {
    let mut versioned: Vec<(semver::Version, HostTag)> = tags
        .into_iter()
        .filter_map(|tag| match parse_tag_version(&tag.name) {
            Some(version) => Some((version, tag)),
            None => {
                debug!(tag = %tag.name, "skipping tag without a semantic version");
                None
            }
        })
        .collect();

    versioned.sort_by(|a, b| b.0.cmp(&a.0));
    versioned
        .into_iter()
        .map(|(_, tag)| ReleaseOrTag::from(tag))
        .collect()
}

fn parse_tag_version(name: &str) -> Option<semver::Version> {
    let bare = name.strip_prefix(['v', 'V']).unwrap_or(name);
    semver::Version::parse(bare).ok()
}

/// Render entries as one markdown document
fn render_markdown(entries: &[ChangelogEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let heading = match entry.published_at {
                Some(date) => format!("## {} ({})", entry.display_name, date.format("%Y-%m-%d")),
                None => format!("## {}", entry.display_name),
            };
            let mut parts = vec![heading];
            if !entry.formatted_body.trim().is_empty() {
                parts.push(entry.formatted_body.clone());
            }
            if entry.is_failed() {
                parts.push("_Full commit history could not be retrieved._".to_string());
            }
            parts.join("\n\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use relnotes_changelog::ChangelogSummary;

    fn release(tag: &str, draft: bool) -> HostRelease {
        HostRelease {
            tag_name: tag.to_string(),
            name: None,
            body: None,
            published_at: None,
            html_url: None,
            prerelease: false,
            draft,
            target_commitish: None,
        }
    }

    fn tag(name: &str) -> HostTag {
        HostTag {
            name: name.to_string(),
            commit_sha: None,
        }
    }

    fn entry(name: &str, body: &str) -> ChangelogEntry {
        ChangelogEntry {
            version: name.to_string(),
            display_name: name.to_string(),
            is_latest: false,
            published_at: None,
            url: String::new(),
            prerelease: false,
            draft: false,
            commits: Vec::new(),
            summary: ChangelogSummary::default(),
            description: String::new(),
            formatted_body: body.to_string(),
            error: None,
        }
    }

    #[test]
    fn test_parse_repository() {
        assert_eq!(parse_repository("octo/app").unwrap(), ("octo", "app"));
        assert_eq!(parse_repository("octo/app.git").unwrap(), ("octo", "app"));
        assert_eq!(parse_repository(" octo/app/ ").unwrap(), ("octo", "app"));
        assert!(parse_repository("octo").is_err());
        assert!(parse_repository("/app").is_err());
        assert!(parse_repository("octo/app/extra").is_err());
    }

    #[test]
    fn test_select_releases_filters_drafts() {
        let releases = vec![release("v2.0.0", true), release("v1.0.0", false)];

        let published = select_releases(releases.clone(), false);
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].tag_name, "v1.0.0");

        let all = select_releases(releases, true);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_tags_sorted_by_version() {
        let tags = vec![
            tag("v1.2.0"),
            tag("v1.10.0"),
            tag("nightly"),
            tag("1.9.0"),
            tag("v2.0.0-rc.1"),
        ];

        let sorted: Vec<String> = sort_tags_newest_first(tags)
            .into_iter()
            .map(|t| t.tag_name)
            .collect();
        assert_eq!(sorted, vec!["v2.0.0-rc.1", "v1.10.0", "1.9.0", "v1.2.0"]);
    }

    #[test]
    fn test_render_markdown() {
        let mut first = entry("v1.1.0", "### 🚀 Features\n\n- Add search ([abc1234](u))");
        first.published_at = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let second = entry("v1.0.0", "");

        let output = render_markdown(&[first, second]);
        assert_eq!(
            output,
            "## v1.1.0 (2024-05-01)\n\n### 🚀 Features\n\n- Add search ([abc1234](u))\n\n## v1.0.0"
        );
    }

    #[test]
    fn test_render_failed_entry() {
        let mut failed = entry("v1.0.0", "Hand-written notes");
        failed.error = Some("Unable to retrieve commit history: boom".to_string());

        let output = render_markdown(&[failed]);
        assert_eq!(
            output,
            "## v1.0.0\n\nHand-written notes\n\n_Full commit history could not be retrieved._"
        );
    }
}
