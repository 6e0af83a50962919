//! Extractor configuration
//!
//! The heuristics that decide which table is the "main" one and which
//! sections concern build time or gem costs are driven by plain word lists.
//! They live here as named tables so another wiki or locale can swap them
//! without touching the extractor.
//!
//! # Configuration
//!
//! Defaults can be overridden from a JSON file or from environment
//! variables (comma-separated lists):
//!
//! - `WIKI_EXTRACT_LEVEL_HINTS`: header words that mark a level column
//! - `WIKI_EXTRACT_TIME_KEYWORDS`: title words that mark a time/cost section
//! - `WIKI_EXTRACT_SECTION_TAGS`: heading tags that open a section
//!
//! # Example
//!
//! ```rust,no_run
//! use wiki_extract::config::ExtractorConfig;
//!
//! let config = ExtractorConfig::from_json_file("vocab.json").expect("config error");
//! assert!(config.is_level_header("Lv."));
//! ```

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Environment variable overriding [`ExtractorConfig::level_hints`]
pub const ENV_LEVEL_HINTS: &str = "WIKI_EXTRACT_LEVEL_HINTS";
/// Environment variable overriding [`ExtractorConfig::time_keywords`]
pub const ENV_TIME_KEYWORDS: &str = "WIKI_EXTRACT_TIME_KEYWORDS";
/// Environment variable overriding [`ExtractorConfig::section_tags`]
pub const ENV_SECTION_TAGS: &str = "WIKI_EXTRACT_SECTION_TAGS";

/// Header words that identify a level column
pub const DEFAULT_LEVEL_HINTS: &[&str] = &["lv", "level", "레벨", "단계", "tier"];

/// Title words that identify a gem/time/speed-up section
pub const DEFAULT_TIME_KEYWORDS: &[&str] = &[
    "gem",
    "gems",
    "젬",
    "다이아",
    "diamond",
    "time",
    "build time",
    "construction time",
    "건설시간",
    "시간",
    "speedup",
    "speed up",
    "가속",
];

/// Heading tags that open a section
pub const DEFAULT_SECTION_TAGS: &[&str] = &["h2", "h3", "h4"];

/// Heuristic vocabularies and scorer weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Case-insensitive substrings that mark a header as the level column
    pub level_hints: Vec<String>,
    /// Case-insensitive substrings that mark a section title as time/cost related
    pub time_keywords: Vec<String>,
    /// Heading tag names that delimit sections
    pub section_tags: Vec<String>,
    /// Prefix of tier labels such as `fc5-1`
    pub tier_prefix: String,
    /// Bonus for a table whose headers contain a level column
    pub level_header_bonus: u32,
    /// Cap on the row-count contribution to a table's score
    pub max_row_score: u32,
    /// Bonus per sampled row whose first cell looks like a level label
    pub levelish_row_bonus: u32,
    /// Number of leading rows sampled for level-looking first cells
    pub levelish_sample: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            level_hints: to_owned_list(DEFAULT_LEVEL_HINTS),
            time_keywords: to_owned_list(DEFAULT_TIME_KEYWORDS),
            section_tags: to_owned_list(DEFAULT_SECTION_TAGS),
            tier_prefix: "fc".to_string(),
            level_header_bonus: 100,
            max_row_score: 200,
            levelish_row_bonus: 5,
            levelish_sample: 20,
        }
    }
}

impl ExtractorConfig {
    /// Build a configuration from defaults plus environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVocabulary` if an override leaves a
    /// required vocabulary empty or names an unsupported heading tag.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(list) = env_list(ENV_LEVEL_HINTS) {
            info!("Level hints overridden from {}", ENV_LEVEL_HINTS);
            config.level_hints = list;
        }
        if let Some(list) = env_list(ENV_TIME_KEYWORDS) {
            info!("Time keywords overridden from {}", ENV_TIME_KEYWORDS);
            config.time_keywords = list;
        }
        if let Some(list) = env_list(ENV_SECTION_TAGS) {
            info!("Section tags overridden from {}", ENV_SECTION_TAGS);
            config.section_tags = list;
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    ///
    /// Fields missing from the file keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;

        debug!("Loaded extractor config from {}", path.display());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Check the vocabularies are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level_hints.is_empty() {
            return Err(ConfigError::InvalidVocabulary {
                name: "level_hints",
                reason: "must not be empty".to_string(),
            });
        }
        if self.section_tags.is_empty() {
            return Err(ConfigError::InvalidVocabulary {
                name: "section_tags",
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(bad) = self.section_tags.iter().find(|t| !is_heading_tag(t)) {
            return Err(ConfigError::InvalidVocabulary {
                name: "section_tags",
                reason: format!("`{}` is not a heading tag (h1-h6)", bad),
            });
        }
        Ok(())
    }

    /// Whether a column header names the level column
    pub fn is_level_header(&self, header: &str) -> bool {
        let lower = header.to_lowercase();
        self.level_hints.iter().any(|h| lower.contains(h.as_str()))
    }

    /// Whether a section title concerns gems, build time or speed-ups
    pub fn is_time_related(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.time_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Whether an element tag name opens a section
    pub fn is_section_tag(&self, tag: &str) -> bool {
        self.section_tags.iter().any(|t| t == tag)
    }

    /// CSS selector list matching every section heading, e.g. `h2, h3, h4`
    pub fn section_selector(&self) -> String {
        self.section_tags.join(", ")
    }

    /// Trim and lower-case every vocabulary entry, dropping blanks
    pub fn normalize(&mut self) {
        for list in [
            &mut self.level_hints,
            &mut self.time_keywords,
            &mut self.section_tags,
        ] {
            for item in list.iter_mut() {
                *item = item.trim().to_lowercase();
            }
            list.retain(|item| !item.is_empty());
        }
        self.tier_prefix = self.tier_prefix.trim().to_lowercase();
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn env_list(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    Some(
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}
