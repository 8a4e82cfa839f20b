//! Configuration types

use serde::{Deserialize, Serialize};

use crate::types::Category;

/// Main configuration for relnotes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// VCS host connection settings
    pub host: HostConfig,

    /// Pipeline behavior
    pub pipeline: PipelineConfig,

    /// Classification and formatting
    pub changelog: ChangelogConfig,
}

/// VCS host connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// REST API base URL
    pub api_url: String,

    /// Web base URL, used to build links to tags
    pub web_url: String,

    /// Environment variable holding the access token
    pub token_env: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            web_url: "https://github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            timeout_secs: 30,
            user_agent: "relnotes".to_string(),
        }
    }
}

/// Pipeline behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Page size for commit listings (host maximum is 100)
    pub per_page: u32,

    /// Maximum number of entries built concurrently
    pub concurrency: usize,

    /// Use the repository's first commit as the base of the oldest release
    pub anchor_first_release_at_origin: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            per_page: 100,
            concurrency: 4,
            anchor_first_release_at_origin: true,
        }
    }
}

/// Classification and formatting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Body used when no commits were classified
    pub empty_message: String,

    /// Remove `[skip ci]` / `[ci skip]` markers from titles
    pub strip_ci_markers: bool,

    /// Section headings used in generated markdown
    pub sections: SectionHeadings,

    /// Ordered classification rules; the first matching rule wins
    pub rules: Vec<ClassificationRule>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            empty_message: "No changes found for this release.".to_string(),
            strip_ci_markers: true,
            sections: SectionHeadings::default(),
            rules: default_rules(),
        }
    }
}

/// A single classification rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Category assigned when the rule matches
    pub category: Category,

    /// Case-insensitive prefixes tested against the commit title
    #[serde(default)]
    pub title_prefixes: Vec<String>,

    /// Case-insensitive substrings tested against the full message
    #[serde(default)]
    pub message_markers: Vec<String>,
}

impl ClassificationRule {
    /// Create a rule from prefix and marker lists
    pub fn new(category: Category, title_prefixes: &[&str], message_markers: &[&str]) -> Self {
        Self {
            category,
            title_prefixes: title_prefixes.iter().map(|s| s.to_string()).collect(),
            message_markers: message_markers.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The built-in rule list, in precedence order
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(
            Category::Feature,
            &["feat", "feature", "add", "enhance", "new"],
            &["feat:", "feature:"],
        ),
        ClassificationRule::new(
            Category::Fix,
            &["fix", "bug", "issue", "resolve", "close"],
            &["fix:", "bug:"],
        ),
        ClassificationRule::new(
            Category::Improvement,
            &["refactor", "perf", "improve", "update", "optimize", "chore"],
            &["refactor:", "perf:", "improve:", "update:"],
        ),
        ClassificationRule::new(
            Category::Docs,
            &["doc", "readme", "changelog"],
            &["doc:", "docs:", "readme:"],
        ),
    ]
}

/// Markdown section headings per category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionHeadings {
    pub feature: String,
    pub fix: String,
    pub improvement: String,
    pub docs: String,
    pub other: String,
}

impl SectionHeadings {
    /// Heading text for a category
    pub fn heading(&self, category: Category) -> &str {
        match category {
            Category::Feature => &self.feature,
            Category::Fix => &self.fix,
            Category::Improvement => &self.improvement,
            Category::Docs => &self.docs,
            Category::Other => &self.other,
        }
    }
}

impl Default for SectionHeadings {
    fn default() -> Self {
        Self {
            feature: Category::Feature.default_heading().to_string(),
            fix: Category::Fix.default_heading().to_string(),
            improvement: Category::Improvement.default_heading().to_string(),
            docs: Category::Docs.default_heading().to_string(),
            other: Category::Other.default_heading().to_string(),
        }
    }
}
