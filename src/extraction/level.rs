//! Level-label ordering
//!
//! Upgrade tables label their rows with keys like `5`, `30-1` or `fc5-1`.
//! [`LevelKey`] orders them numerically: plain labels first, then
//! tier-prefixed labels, then anything else.

use std::cmp::Ordering;

use crate::config::ExtractorConfig;
use crate::extraction::value::CellValue;

/// Label group, in sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LevelGroup {
    /// `30`, `30-1`
    Numeric,
    /// `fc5`, `fc5-1`
    Tiered,
    /// Everything else
    Other,
}

/// Sort key for a level label
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct LevelKey {
    /// Which group the label falls in
    pub group: LevelGroup,
    /// Level or tier number
    pub primary: u64,
    /// Sub-stage after the dash, 0 when absent
    pub sub: u64,
    /// Trimmed original label, last tie-break
    pub label: String,
}

impl LevelKey {
    /// Build the key for a label, with `tier_prefix` naming tiered labels
    pub fn new(label: &str, tier_prefix: &str) -> Self {
        let label = label.trim().to_string();
        let lower = label.to_lowercase();

        if let Some((primary, sub)) = parse_numbered(&lower) {
            return Self {
                group: LevelGroup::Numeric,
                primary,
                sub,
                label,
            };
        }

        if !tier_prefix.is_empty() {
            if let Some((primary, sub)) = lower.strip_prefix(tier_prefix).and_then(parse_numbered) {
                return Self {
                    group: LevelGroup::Tiered,
                    primary,
                    sub,
                    label,
                };
            }
        }

        Self {
            group: LevelGroup::Other,
            primary: 0,
            sub: 0,
            label,
        }
    }

    /// Build the key for a typed cell
    pub fn for_cell(value: &CellValue, tier_prefix: &str) -> Self {
        Self::new(&value.to_string(), tier_prefix)
    }
}

impl From<&str> for LevelKey {
    fn from(label: &str) -> Self {
        Self::new(label, "fc")
    }
}

// `N` or `N-M`, ASCII digits only.
fn parse_numbered(s: &str) -> Option<(u64, u64)> {
    let (head, tail) = match s.split_once('-') {
        Some((head, tail)) => (head, Some(tail)),
        None => (s, None),
    };
    let primary = parse_digits(head)?;
    let sub = match tail {
        Some(tail) => parse_digits(tail)?,
        None => 0,
    };
    Some((primary, sub))
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Whether a label is a bare or tier-prefixed level like `12`, `3-2` or `fc4`
pub fn is_levelish(label: &str, tier_prefix: &str) -> bool {
    LevelKey::new(label, tier_prefix).group != LevelGroup::Other
}

/// Compare two labels by level order
pub fn compare_labels(a: &str, b: &str, tier_prefix: &str) -> Ordering {
    LevelKey::new(a, tier_prefix).cmp(&LevelKey::new(b, tier_prefix))
}

/// Index of the first header naming the level column
pub fn find_level_column(columns: &[String], config: &ExtractorConfig) -> Option<usize> {
    columns.iter().position(|c| config.is_level_header(c))
}
