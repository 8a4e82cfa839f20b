//! Compiled classification rules

use regex::{Regex, RegexBuilder};
use relnotes_core::config::ClassificationRule;
use relnotes_core::Category;

/// A classification rule with its patterns compiled
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) category: Category,
    title: Option<Regex>,
    message: Option<Regex>,
}

impl CompiledRule {
    /// Compile a configured rule. Prefixes and markers match literally.
    pub(crate) fn compile(rule: &ClassificationRule) -> Result<Self, regex::Error> {
        Ok(Self {
            category: rule.category,
            title: alternation(&rule.title_prefixes, "^")?,
            message: alternation(&rule.message_markers, "")?,
        })
    }

    /// Whether the title starts with one of the prefixes or the message
    /// contains one of the markers
    pub(crate) fn matches(&self, title: &str, message: &str) -> bool {
        self.title.as_ref().is_some_and(|re| re.is_match(title))
            || self.message.as_ref().is_some_and(|re| re.is_match(message))
    }
}

fn alternation(literals: &[String], anchor: &str) -> Result<Option<Regex>, regex::Error> {
    if literals.is_empty() {
        return Ok(None);
    }

    let pattern = literals
        .iter()
        .map(|literal| regex::escape(literal))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&format!("{}(?:{})", anchor, pattern))
        .case_insensitive(true)
        .build()
        .map(Some)
}
