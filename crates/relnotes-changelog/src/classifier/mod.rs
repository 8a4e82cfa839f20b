//! Commit classification
//!
//! Assigns every raw commit a [`Category`] using an ordered rule list. The
//! first matching rule wins; commits no rule matches fall into
//! [`Category::Other`]. Classification is pure and deterministic.

mod rules;
mod title;

pub use title::clean_title;

use relnotes_core::config::ChangelogConfig;
use relnotes_core::{Category, ConfigError};
use relnotes_host::RawCommit;
use tracing::{debug, instrument};

use crate::types::{ChangelogSummary, ClassifiedCommit};
use rules::CompiledRule;

/// Output of a classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Commits grouped by category, input order kept within a category
    pub commits: Vec<ClassifiedCommit>,
    pub summary: ChangelogSummary,
}

/// Rule-based commit classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CompiledRule>,
    strip_ci_markers: bool,
}

impl Classifier {
    /// Build a classifier from configuration
    pub fn new(config: &ChangelogConfig) -> Result<Self, ConfigError> {
        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                CompiledRule::compile(rule).map_err(|e| ConfigError::InvalidValue {
                    field: format!("changelog.rules[{}]", index),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            strip_ci_markers: config.strip_ci_markers,
        })
    }

    /// Category of a single commit
    pub fn categorize(&self, commit: &RawCommit) -> Category {
        let title = commit.title();
        self.rules
            .iter()
            .find(|rule| rule.matches(title, &commit.message))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }

    /// Classify a list of commits
    #[instrument(skip(self, raw), fields(commit_count = raw.len()))]
    pub fn classify(&self, raw: &[RawCommit]) -> Classification {
        let mut summary = ChangelogSummary {
            total_commits: raw.len(),
            ..ChangelogSummary::default()
        };

        let mut commits: Vec<ClassifiedCommit> = raw
            .iter()
            .map(|commit| {
                let category = self.categorize(commit);
                summary.record(category);
                self.to_classified(commit, category)
            })
            .collect();

        // sort_by_key is stable
        commits.sort_by_key(|c| c.category);

        debug!(
            features = summary.features,
            fixes = summary.fixes,
            improvements = summary.improvements,
            docs = summary.docs,
            others = summary.others,
            "commits classified"
        );

        Classification { commits, summary }
    }

    fn to_classified(&self, commit: &RawCommit, category: Category) -> ClassifiedCommit {
        ClassifiedCommit {
            sha: commit.sha.clone(),
            short_sha: commit.sha.chars().take(7).collect(),
            title: clean_title(commit.title(), self.strip_ci_markers),
            full_message: commit.message.clone(),
            date: commit.date,
            author: commit.author.clone(),
            url: commit.html_url.clone(),
            category,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let config = ChangelogConfig::default();
        Self {
            rules: config
                .rules
                .iter()
                .filter_map(|rule| CompiledRule::compile(rule).ok())
                .collect(),
            strip_ci_markers: config.strip_ci_markers,
        }
    }
}
