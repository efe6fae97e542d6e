//! Favorite-dashboard entity model and read views.

use indexmap::IndexSet;
use serde::Serialize;
use sqlx::FromRow;
use dashshare_core::types::{DbId, Timestamp};

use super::dashboard::DashboardView;

/// Raw `user_favorites` row.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct FavoriteRow {
    pub user_id: DbId,
    pub dashboard_id: DbId,
    pub sort_order: i32,
    pub tags: Vec<String>,
    pub added_at: Timestamp,
}

/// One entry of a user's ordered bookmark list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub user_id: DbId,
    pub dashboard_id: DbId,
    pub order: i32,
    pub tags: IndexSet<String>,
    pub added_at: Timestamp,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            user_id: row.user_id,
            dashboard_id: row.dashboard_id,
            order: row.sort_order,
            tags: row.tags.into_iter().collect(),
            added_at: row.added_at,
        }
    }
}

/// Result of a favorite-status lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteStatus {
    pub is_favorited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<Timestamp>,
    pub tags: IndexSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl From<Option<&Favorite>> for FavoriteStatus {
    fn from(favorite: Option<&Favorite>) -> Self {
        match favorite {
            Some(f) => Self {
                is_favorited: true,
                added_at: Some(f.added_at),
                tags: f.tags.clone(),
                order: Some(f.order),
            },
            None => Self::default(),
        }
    }
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub dashboard_id: DbId,
    pub is_favorite: bool,
}

/// A favorited dashboard decorated with the bookmark's own fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDashboard {
    #[serde(flatten)]
    pub dashboard: DashboardView,
    pub favorited_at: Timestamp,
    pub favorite_tags: IndexSet<String>,
    pub favorite_order: i32,
}

/// A dashboard with the number of users who favorited it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedDashboard {
    #[serde(flatten)]
    pub dashboard: DashboardView,
    pub favorite_count: i64,
}
