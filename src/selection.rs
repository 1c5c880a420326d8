//! Location and volume selection.
//!
//! - `LocationFilter`: operator allow-list of locations, glob patterns
//!   separated by commas and/or whitespace. Empty means every location.
//! - `TagFilter`: `key=value` pairs combined with a [`TagFilteringMode`].
//!   Empty means every volume.

use crate::error::{OptimizerError, Result};
use crate::types::TagFilteringMode;
use std::collections::BTreeMap;

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Glob matching with `*` (any run) and `?` (any single character).
pub fn glob_match(pattern: &str, value: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let val: Vec<char> = value.chars().collect();
    glob_match_inner(&pat, &val)
}

fn glob_match_inner(pat: &[char], val: &[char]) -> bool {
    match pat.first() {
        None => val.is_empty(),
        Some('*') => (0..=val.len()).any(|i| glob_match_inner(&pat[1..], &val[i..])),
        Some('?') => !val.is_empty() && glob_match_inner(&pat[1..], &val[1..]),
        Some(c) => val.first() == Some(c) && glob_match_inner(&pat[1..], &val[1..]),
    }
}

/// Locations the operator enabled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    patterns: Vec<String>,
}

impl LocationFilter {
    pub fn parse(allow_list: &str) -> Self {
        Self {
            patterns: split_list(allow_list).map(str::to_string).collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_enabled(&self, location: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| glob_match(p, location))
    }
}

/// Tag-based volume selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    tags: BTreeMap<String, String>,
    mode: TagFilteringMode,
}

impl TagFilter {
    /// Parse `key=value[,key=value]`. Every entry must name its value.
    pub fn parse(filters: &str, mode: TagFilteringMode) -> Result<Self> {
        let mut tags = BTreeMap::new();
        for entry in split_list(filters) {
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                OptimizerError::config(format!("tag filter {:?} is not of the form key=value", entry))
            })?;
            if key.is_empty() {
                return Err(OptimizerError::config(format!(
                    "tag filter {:?} has an empty key",
                    entry
                )));
            }
            tags.insert(key.to_string(), value.to_string());
        }
        Ok(Self { tags, mode })
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn mode(&self) -> TagFilteringMode {
        self.mode
    }

    fn matches(&self, tags: &BTreeMap<String, String>) -> bool {
        self.tags
            .iter()
            .all(|(key, value)| tags.get(key).is_some_and(|v| v == value))
    }

    /// Returns true if a volume with `tags` should be processed
    pub fn is_selected(&self, tags: &BTreeMap<String, String>) -> bool {
        if self.is_empty() {
            return true;
        }
        match self.mode {
            TagFilteringMode::OptIn => self.matches(tags),
            TagFilteringMode::OptOut => !self.matches(tags),
        }
    }
}
