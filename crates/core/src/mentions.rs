//! `@name` mention extraction for comment text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// `@` followed by one or more ASCII word characters.
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("mention pattern is valid"));

/// Extract the names mentioned in `text`, without the leading `@`.
///
/// Duplicates are removed case-sensitively and the result keeps the order in
/// which each name first appears. Names are returned as typed; resolving them
/// to users is case-insensitive and happens at the service layer.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// `true` if `text` contains at least one mention token.
pub fn has_mentions(text: &str) -> bool {
    MENTION_RE.is_match(text)
}
