//! Cell value typing
//!
//! Table cells arrive as display text. Plain and comma-grouped numbers are
//! turned into numbers so the data site can sort and compare them, while
//! formatted values such as `50%` or `1d 2h` are kept verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A typed table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Integer, including comma-grouped input like `1,234`
    Int(i64),
    /// Plain decimal like `2.5`
    Float(f64),
    /// Anything else, including the empty string
    Text(String),
}

impl CellValue {
    /// Whether the value is blank once rendered as text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Borrow the text of a `Text` value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(n) => write!(f, "{}", n),
            // Same rendering as the JSON number, so `2.0` stays `2.0`
            CellValue::Float(x) => match serde_json::Number::from_f64(*x) {
                Some(n) => write!(f, "{}", n),
                None => write!(f, "{}", x),
            },
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Int(n)
    }
}

impl From<&CellValue> for serde_json::Value {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Int(n) => serde_json::Value::from(*n),
            CellValue::Float(x) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

fn grouped_int_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]{1,3}(?:,[0-9]{3})+$").expect("hardcoded grouped-int regex is valid")
    })
}

fn digits_commas_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9,]+$").expect("hardcoded digits regex is valid"))
}

fn decimal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("hardcoded decimal regex is valid"))
}

/// Collapse runs of whitespace into single spaces and trim
pub fn clean_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Type a cell's text
///
/// Numbers only come out of text made of ASCII digits (with optional
/// comma grouping or a single decimal point). Values too large for `i64`
/// stay text.
pub fn smart_value(raw: &str) -> CellValue {
    let v = clean_text(raw);
    if v.is_empty() {
        return CellValue::Text(v);
    }

    if looks_formatted(&v) && !digits_commas_re().is_match(&v) {
        return CellValue::Text(v);
    }

    if grouped_int_re().is_match(&v) {
        return match v.replace(',', "").parse::<i64>() {
            Ok(n) => CellValue::Int(n),
            Err(_) => CellValue::Text(v),
        };
    }

    if v.bytes().all(|b| b.is_ascii_digit()) {
        return match v.parse::<i64>() {
            Ok(n) => CellValue::Int(n),
            Err(_) => CellValue::Text(v),
        };
    }

    if decimal_re().is_match(&v) {
        return match v.parse::<f64>() {
            Ok(x) => CellValue::Float(x),
            Err(_) => CellValue::Text(v),
        };
    }

    CellValue::Text(v)
}

// Percentages, clock times and durations ending in a unit letter.
fn looks_formatted(v: &str) -> bool {
    v.contains('%')
        || v.contains(':')
        || v
            .chars()
            .last()
            .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'd' | 'h' | 'm' | 's'))
}
