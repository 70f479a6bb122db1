//! Line-oriented `key = value` parsing.
//!
//! Format:
//! ```text
//! # comment
//! syncdir = ~/dotsync
//! userspacedir = "~/"
//! autosync
//! ```
//!
//! Keys are lowercased. Surrounding whitespace and one pair of surrounding
//! double quotes are trimmed from values. A line holding only a key has no
//! value.
use crate::error::ConfigError;

/// One `key = value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number.
    pub line: usize,
    /// Lowercased key.
    pub key: String,
    /// Trimmed value; `None` for a bare key.
    pub value: Option<String>,
}

/// Parse key/value content from a string.
///
/// # Examples
///
/// ```
/// use dotsync::config::kv::parse_from_str;
///
/// let entries = parse_from_str("# sync\nSyncDir = \"~/dotsync\"\nautosync\n").unwrap();
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].key, "syncdir");
/// assert_eq!(entries[0].value.as_deref(), Some("~/dotsync"));
/// assert_eq!(entries[1].line, 3);
/// assert_eq!(entries[1].value, None);
/// ```
///
/// # Errors
///
/// Returns [`ConfigError::Malformed`] if a key is empty or contains
/// whitespace.
pub fn parse_from_str(content: &str) -> Result<Vec<Entry>, ConfigError> {
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = match trimmed.split_once('=') {
            Some((key, value)) => (key.trim(), Some(unquote(value.trim()).to_string())),
            None => (trimmed, None),
        };
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(ConfigError::Malformed {
                line: idx + 1,
                message: format!("invalid key in '{trimmed}'"),
            });
        }

        entries.push(Entry {
            line: idx + 1,
            key: key.to_lowercase(),
            value,
        });
    }

    Ok(entries)
}

/// Strip one pair of surrounding double quotes.
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
