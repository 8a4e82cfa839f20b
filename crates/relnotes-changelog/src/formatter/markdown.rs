//! Markdown changelog formatter

use relnotes_core::config::{ChangelogConfig, SectionHeadings};
use relnotes_core::Category;
use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::types::ClassifiedCommit;

/// Markdown changelog formatter.
///
/// Emits one `###` section per non-empty category in category order, each
/// commit as `- Title ([abc1234](url))`.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    headings: SectionHeadings,
    empty_message: String,
}

impl MarkdownFormatter {
    /// Create a formatter with the default headings
    pub fn new() -> Self {
        Self::from_config(&ChangelogConfig::default())
    }

    /// Create a formatter from configuration
    pub fn from_config(config: &ChangelogConfig) -> Self {
        Self {
            headings: config.sections.clone(),
            empty_message: config.empty_message.clone(),
        }
    }

    fn format_commit(commit: &ClassifiedCommit) -> String {
        if commit.url.is_empty() {
            format!("- {} ({})", commit.title, commit.short_sha)
        } else {
            format!("- {} ([{}]({}))", commit.title, commit.short_sha, commit.url)
        }
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip(self, commits), fields(commit_count = commits.len()))]
    fn format(&self, commits: &[ClassifiedCommit]) -> String {
        let sections: Vec<String> = Category::ALL
            .iter()
            .filter_map(|&category| {
                let lines: Vec<String> = commits
                    .iter()
                    .filter(|c| c.category == category)
                    .map(Self::format_commit)
                    .collect();

                if lines.is_empty() {
                    return None;
                }

                Some(format!(
                    "### {}\n\n{}",
                    self.headings.heading(category),
                    lines.join("\n")
                ))
            })
            .collect();

        debug!(section_count = sections.len(), "markdown body rendered");

        if sections.is_empty() {
            self.empty_message.clone()
        } else {
            sections.join("\n\n")
        }
    }
}
