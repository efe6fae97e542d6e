//! Favorite-dashboard ordering, tagging and ranking rules.
//!
//! A user's favorites form an ordered list whose `order` values are always
//! the dense sequence `0..n` after a mutation. Tags on a favorite behave as
//! an insertion-ordered set.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::types::DbId;

/// Default number of entries returned by the most-favorited ranking.
pub const DEFAULT_MOST_FAVORITED_LIMIT: usize = 10;

/// Upper bound accepted for the most-favorited `limit` parameter.
pub const MAX_MOST_FAVORITED_LIMIT: usize = 100;

/// Build the new favorite ordering from a client-supplied ordering.
///
/// Every id in `requested` must already be a favorite, and no id may repeat;
/// otherwise the whole request is rejected. Favorites the client left out
/// keep their relative order and follow the requested ones, so the result
/// is always a permutation of `current`.
pub fn plan_reorder(current: &[DbId], requested: &[DbId]) -> Result<Vec<DbId>, String> {
    let known: HashSet<DbId> = current.iter().copied().collect();

    if requested.iter().any(|id| !known.contains(id)) {
        return Err("Some dashboards are not in your favorites".to_string());
    }

    let mut seen = HashSet::with_capacity(requested.len());
    if !requested.iter().all(|id| seen.insert(*id)) {
        return Err("Favorite ordering contains duplicate dashboard ids".to_string());
    }

    let mut ordered = requested.to_vec();
    ordered.extend(current.iter().copied().filter(|id| !seen.contains(id)));
    Ok(ordered)
}

/// Trim tags and drop empty ones, keeping first-seen order without duplicates.
pub fn normalize_tags<I, S>(tags: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Set-union of `existing` and `added`; existing tags keep their position.
pub fn add_tags(existing: &IndexSet<String>, added: &[String]) -> IndexSet<String> {
    let mut merged = existing.clone();
    merged.extend(normalize_tags(added));
    merged
}

/// `existing` without any tag listed in `removed`.
pub fn remove_tags(existing: &IndexSet<String>, removed: &[String]) -> IndexSet<String> {
    let removed = normalize_tags(removed);
    existing
        .iter()
        .filter(|t| !removed.contains(*t))
        .cloned()
        .collect()
}

/// Rank `(dashboard_id, favorite_count)` pairs by count, highest first.
///
/// The sort is stable, so ties keep the order in which the counts were
/// enumerated. At most `limit` entries are returned.
pub fn rank_by_favorites(mut counts: Vec<(DbId, i64)>, limit: usize) -> Vec<(DbId, i64)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}

/// Clamp a client-supplied ranking limit, defaulting when absent or zero.
pub fn clamp_ranking_limit(limit: Option<usize>) -> usize {
    match limit {
        Some(0) | None => DEFAULT_MOST_FAVORITED_LIMIT,
        Some(n) => n.min(MAX_MOST_FAVORITED_LIMIT),
    }
}
