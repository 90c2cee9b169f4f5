//! Branch-name normalization.
//!
//! Turns an issue title into the slug used in a branch name and an issue type
//! into a branch category. Everything here is pure and ASCII-only: titles are
//! case-folded with ASCII rules and every non-alphanumeric character ends up as
//! the `_` separator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used between words of a slug.
pub const SEPARATOR: char = '_';

/// Maximum slug length used when no override is configured.
pub const DEFAULT_MAX_SLUG_LENGTH: usize = 60;

/// Platform words that carry no meaning in a branch name.
pub const DEFAULT_NOISE_WORDS: &[&str] = &["android", "ios"];

/// Branch category, the first path component of a branch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// New work (stories and everything that is not a bug)
    Feature,
    /// Bug fix
    Bug,
}

impl Category {
    /// Prefix as it appears in the branch name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a tracker issue type name to a branch category.
///
/// Unknown types fall back to [`Category::Feature`].
pub fn classify(issue_type: &str) -> Category {
    if issue_type.eq_ignore_ascii_case("bug") {
        Category::Bug
    } else {
        // "story" and anything we don't know about yet
        Category::Feature
    }
}

/// Rules applied when turning a title into a slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRules {
    /// Substrings removed from the title before slugifying (matched case-insensitively)
    pub noise_words: Vec<String>,

    /// Maximum slug length in characters
    pub max_slug_length: usize,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            noise_words: DEFAULT_NOISE_WORDS.iter().map(|w| (*w).to_string()).collect(),
            max_slug_length: DEFAULT_MAX_SLUG_LENGTH,
        }
    }
}

impl NamingRules {
    /// Lower-case the title, strip the noise words and trim surrounding whitespace.
    pub fn trim_rules(&self, title: &str) -> String {
        let noise: Vec<String> = self
            .noise_words
            .iter()
            .map(|w| w.to_ascii_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        let mut output = title.to_ascii_lowercase();

        // Removing one word can join the halves of another ("andiosroid").
        loop {
            let stripped = noise.iter().fold(output.clone(), |acc, word| acc.replace(word, ""));
            if stripped == output {
                break;
            }
            output = stripped;
        }

        output.trim().to_string()
    }

    /// Build the branch-name fragment for a title.
    pub fn slugify(&self, title: &str) -> String {
        let trimmed = self.trim_rules(title);

        let replaced: String = trimmed
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { SEPARATOR })
            .collect();

        let collapsed = collapse_separators(&replaced);
        let slug = collapsed.trim_matches(SEPARATOR);

        // Only ASCII is left at this point, so byte and char counts agree.
        let truncated = if slug.len() > self.max_slug_length {
            &slug[..self.max_slug_length]
        } else {
            slug
        };

        truncated.trim_end_matches(SEPARATOR).to_string()
    }
}

/// Lower-case `title`, strip the default noise words and trim whitespace.
pub fn trim_rules(title: &str) -> String {
    NamingRules::default().trim_rules(title)
}

/// Slugify `title` with the default [`NamingRules`].
pub fn slugify(title: &str) -> String {
    NamingRules::default().slugify(title)
}

/// Collapse runs of adjacent separators into one.
///
/// Other repeated characters are left alone.
pub fn collapse_separators(input: &str) -> String {
    let (collapsed, _) =
        input.chars().fold((String::with_capacity(input.len()), None), |(mut out, prev), c| {
            if !(c == SEPARATOR && prev == Some(SEPARATOR)) {
                out.push(c);
            }
            (out, Some(c))
        });
    collapsed
}
