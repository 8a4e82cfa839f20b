//! Core types shared across relnotes crates

use serde::{Deserialize, Serialize};

/// Classification outcome for a single commit.
///
/// Variant order is the section order of a generated changelog body and the
/// order classified commits are listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// New functionality
    Feature,
    /// Bug fix
    Fix,
    /// Refactoring, performance or maintenance work
    Improvement,
    /// Documentation
    Docs,
    /// Anything not matched by a rule
    Other,
}

impl Category {
    /// All categories in precedence order
    pub const ALL: [Category; 5] = [
        Self::Feature,
        Self::Fix,
        Self::Improvement,
        Self::Docs,
        Self::Other,
    ];

    /// Returns the string representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Improvement => "improvement",
            Self::Docs => "docs",
            Self::Other => "other",
        }
    }

    /// Default markdown heading text for this category
    pub fn default_heading(&self) -> &'static str {
        match self {
            Self::Feature => "🚀 Features",
            Self::Fix => "🐞 Bug Fixes",
            Self::Improvement => "🛠 Improvements",
            Self::Docs => "📝 Documentation",
            Self::Other => "📦 Other Changes",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feature" | "feat" | "features" => Ok(Self::Feature),
            "fix" | "fixes" | "bugfix" => Ok(Self::Fix),
            "improvement" | "improvements" => Ok(Self::Improvement),
            "docs" | "doc" | "documentation" => Ok(Self::Docs),
            "other" | "others" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_matches_precedence() {
        let mut shuffled = vec![
            Category::Other,
            Category::Docs,
            Category::Feature,
            Category::Improvement,
            Category::Fix,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Category::ALL.to_vec());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("feat".parse::<Category>().unwrap(), Category::Feature);
        assert_eq!("Docs".parse::<Category>().unwrap(), Category::Docs);
        assert!("unknown".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&Category::Improvement).unwrap();
        assert_eq!(json, "\"improvement\"");
    }
}
