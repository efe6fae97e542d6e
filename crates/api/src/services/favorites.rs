//! Per-user favorite dashboards: membership, ordering, tags and ranking.

use std::collections::HashSet;

use dashshare_core::access::can_access_dashboard;
use dashshare_core::favorites::{
    add_tags, clamp_ranking_limit, normalize_tags, plan_reorder, rank_by_favorites, remove_tags,
};
use dashshare_core::roles::Role;
use dashshare_core::types::DbId;
use dashshare_db::models::dashboard::{DashboardFilter, DashboardView};
use dashshare_db::models::favorite::{
    Favorite, FavoriteDashboard, FavoriteStatus, RankedDashboard, ToggleOutcome,
};
use dashshare_db::models::user::User;
use indexmap::IndexSet;

use super::DashboardService;
use crate::error::{AppError, AppResult};

const FAVORITE_ACCESS_DENIED: &str = "You must have access to the dashboard to favorite it";

impl DashboardService {
    /// Append a dashboard the actor can see to their favorites.
    /// Favoriting the same dashboard twice is a 400.
    pub async fn add_favorite(&self, actor: &User, dashboard_id: DbId) -> AppResult<Favorite> {
        self.load_accessible(dashboard_id, actor, FAVORITE_ACCESS_DENIED)
            .await?;

        let current = self.store.list_favorites(actor.id).await?;
        if current.iter().any(|f| f.dashboard_id == dashboard_id) {
            return Err(AppError::validation("Dashboard already in favorites"));
        }

        let favorite = self.store.append_favorite(actor.id, dashboard_id).await?;
        tracing::info!(dashboard_id, user_id = actor.id, order = favorite.order, "Favorite added");
        Ok(favorite)
    }

    /// Remove a favorite; the rest are renumbered `0..n`.
    pub async fn remove_favorite(&self, actor: &User, dashboard_id: DbId) -> AppResult<()> {
        if !self.store.remove_favorite(actor.id, dashboard_id).await? {
            return Err(AppError::not_found("Favorite", dashboard_id));
        }
        tracing::info!(dashboard_id, user_id = actor.id, "Favorite removed");
        Ok(())
    }

    /// Flip favorite membership of a dashboard the actor can see.
    pub async fn toggle_favorite(&self, actor: &User, dashboard_id: DbId) -> AppResult<ToggleOutcome> {
        self.load_accessible(dashboard_id, actor, FAVORITE_ACCESS_DENIED)
            .await?;

        let current = self.store.list_favorites(actor.id).await?;
        let is_favorite = if current.iter().any(|f| f.dashboard_id == dashboard_id) {
            self.store.remove_favorite(actor.id, dashboard_id).await?;
            false
        } else {
            self.store.append_favorite(actor.id, dashboard_id).await?;
            true
        };

        tracing::info!(dashboard_id, user_id = actor.id, is_favorite, "Favorite toggled");
        Ok(ToggleOutcome {
            dashboard_id,
            is_favorite,
        })
    }

    /// The actor's favorites in list order, each with full dashboard details.
    ///
    /// Favorites pointing at a deleted dashboard, or one the actor can no
    /// longer see, are left out.
    pub async fn list_favorite_dashboards(&self, actor: &User) -> AppResult<Vec<FavoriteDashboard>> {
        let favorites = self.store.list_favorites(actor.id).await?;
        if favorites.is_empty() {
            return Ok(Vec::new());
        }

        let dashboards = self
            .store
            .list_dashboards(&DashboardFilter {
                ids: Some(favorites.iter().map(|f| f.dashboard_id).collect()),
                ..Default::default()
            })
            .await?;
        let visible: Vec<_> = dashboards
            .into_iter()
            .filter(|d| can_access_dashboard(Some(d.grant()), Some(actor.principal())))
            .collect();
        let views = self.views(&visible).await?;

        Ok(favorites
            .iter()
            .filter_map(|f| {
                views
                    .iter()
                    .find(|v| v.id == f.dashboard_id)
                    .map(|view| FavoriteDashboard {
                        dashboard: view.clone(),
                        favorited_at: f.added_at,
                        favorite_tags: f.tags.clone(),
                        favorite_order: f.order,
                    })
            })
            .collect())
    }

    /// Apply a client ordering. Unknown or repeated ids reject the whole
    /// request and leave the list untouched; favorites left out keep their
    /// relative order after the listed ones. Returns the resulting order.
    pub async fn reorder_favorites(&self, actor: &User, ordering: &[DbId]) -> AppResult<Vec<DbId>> {
        let current: Vec<DbId> = self
            .store
            .list_favorites(actor.id)
            .await?
            .into_iter()
            .map(|f| f.dashboard_id)
            .collect();

        let ordered = plan_reorder(&current, ordering).map_err(AppError::validation)?;
        self.store.set_favorite_order(actor.id, &ordered).await?;

        tracing::info!(user_id = actor.id, count = ordered.len(), "Favorites reordered");
        Ok(ordered)
    }

    /// Add tags to one favorite (set union).
    pub async fn tag_favorite(
        &self,
        actor: &User,
        dashboard_id: DbId,
        tags: &[String],
    ) -> AppResult<Favorite> {
        require_tags(tags)?;
        let favorite = self.find_favorite(actor, dashboard_id).await?;
        self.save_tags(actor, dashboard_id, add_tags(&favorite.tags, tags))
            .await
    }

    /// Remove tags from one favorite; tags it does not carry are ignored.
    pub async fn untag_favorite(
        &self,
        actor: &User,
        dashboard_id: DbId,
        tags: &[String],
    ) -> AppResult<Favorite> {
        require_tags(tags)?;
        let favorite = self.find_favorite(actor, dashboard_id).await?;
        self.save_tags(actor, dashboard_id, remove_tags(&favorite.tags, tags))
            .await
    }

    async fn find_favorite(&self, actor: &User, dashboard_id: DbId) -> AppResult<Favorite> {
        self.store
            .list_favorites(actor.id)
            .await?
            .into_iter()
            .find(|f| f.dashboard_id == dashboard_id)
            .ok_or_else(|| AppError::not_found("Favorite", dashboard_id))
    }

    async fn save_tags(
        &self,
        actor: &User,
        dashboard_id: DbId,
        tags: IndexSet<String>,
    ) -> AppResult<Favorite> {
        self.store
            .set_favorite_tags(actor.id, dashboard_id, &tags)
            .await?
            .ok_or_else(|| AppError::not_found("Favorite", dashboard_id))
    }

    /// Favorite status of a dashboard for a user.
    ///
    /// Never fails: an unknown user, or a storage error, reads as "not
    /// favorited".
    pub async fn check_if_favorited(&self, user_id: DbId, dashboard_id: DbId) -> FavoriteStatus {
        let lookup = async {
            if self.store.find_user(user_id).await?.is_none() {
                return Ok::<_, sqlx::Error>(FavoriteStatus::default());
            }
            let favorites = self.store.list_favorites(user_id).await?;
            Ok(FavoriteStatus::from(
                favorites.iter().find(|f| f.dashboard_id == dashboard_id),
            ))
        };

        match lookup.await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(user_id, dashboard_id, error = %e, "Favorite status lookup failed");
                FavoriteStatus::default()
            }
        }
    }

    /// The role-scoped dashboard list with each entry's favorite flag set.
    pub async fn dashboards_with_favorite_status(&self, actor: &User) -> AppResult<Vec<DashboardView>> {
        let mut views = self.list_dashboards(actor).await?;
        let favorites: HashSet<DbId> = self
            .store
            .list_favorites(actor.id)
            .await?
            .into_iter()
            .map(|f| f.dashboard_id)
            .collect();

        for view in &mut views {
            view.is_favorite = Some(favorites.contains(&view.id));
        }
        Ok(views)
    }

    /// The dashboards favorited most often by users of the actor's company,
    /// highest count first. Ties keep their first-favorited order.
    ///
    /// A SUPER_ADMIN has no company and ranks across every company.
    pub async fn most_favorited_dashboards(
        &self,
        actor: &User,
        limit: Option<usize>,
    ) -> AppResult<Vec<RankedDashboard>> {
        let company_id = match actor.role {
            Role::SuperAdmin => actor.company_id,
            Role::Admin => Some(Self::company_of(actor)?),
            Role::User => {
                return Err(AppError::forbidden(
                    "Only admins can view favorited dashboards analytics",
                ))
            }
        };
        let limit = clamp_ranking_limit(limit);

        let counts = self.store.favorite_counts(company_id).await?;
        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let dashboards = self
            .store
            .list_dashboards(&DashboardFilter {
                company_id,
                ids: Some(counts.iter().map(|(id, _)| *id).collect()),
                ..Default::default()
            })
            .await?;
        let in_scope: HashSet<DbId> = dashboards.iter().map(|d| d.id).collect();

        let ranked = rank_by_favorites(
            counts
                .into_iter()
                .filter(|(id, _)| in_scope.contains(id))
                .collect(),
            limit,
        );

        let views = self.views(&dashboards).await?;
        Ok(ranked
            .into_iter()
            .filter_map(|(id, favorite_count)| {
                views
                    .iter()
                    .find(|v| v.id == id)
                    .map(|view| RankedDashboard {
                        dashboard: view.clone(),
                        favorite_count,
                    })
            })
            .collect())
    }
}

fn require_tags(tags: &[String]) -> AppResult<()> {
    if normalize_tags(tags).is_empty() {
        return Err(AppError::validation("tags must be a non-empty array"));
    }
    Ok(())
}
