//! Service-level tests for favorites: membership, ordering, tags, ranking.

mod common;

use assert_matches::assert_matches;
use common::World;
use dashshare_api::error::AppError;
use dashshare_core::departments::Department;
use dashshare_core::error::CoreError;
use dashshare_core::types::DbId;
use dashshare_db::Store;

async fn favorite_ids(w: &World, user_id: DbId) -> Vec<(DbId, i32)> {
    w.store
        .list_favorites(user_id)
        .await
        .unwrap()
        .into_iter()
        .map(|f| (f.dashboard_id, f.order))
        .collect()
}

// ---------------------------------------------------------------------------
// Add / remove / toggle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_appends_with_dense_order() {
    let w = World::new().await;
    let a = w.shared_dashboard("A", &[&w.alice]).await;
    let b = w.shared_dashboard("B", &[&w.alice]).await;

    let first = w.dashboards.add_favorite(&w.alice, a.id).await.unwrap();
    let second = w.dashboards.add_favorite(&w.alice, b.id).await.unwrap();

    assert_eq!((first.order, second.order), (0, 1));
    assert_eq!(favorite_ids(&w, w.alice.id).await, vec![(a.id, 0), (b.id, 1)]);
}

#[tokio::test]
async fn add_requires_access_and_rejects_duplicates() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("A", &[&w.alice]).await;

    assert_matches!(
        w.dashboards.add_favorite(&w.bob, dashboard.id).await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );
    assert_matches!(
        w.dashboards.add_favorite(&w.alice, 9_999).await,
        Err(AppError::Core(CoreError::NotFound { .. }))
    );

    w.dashboards.add_favorite(&w.alice, dashboard.id).await.unwrap();
    assert_matches!(
        w.dashboards.add_favorite(&w.alice, dashboard.id).await,
        Err(AppError::Core(CoreError::Validation(msg))) if msg == "Dashboard already in favorites"
    );
    assert_eq!(favorite_ids(&w, w.alice.id).await.len(), 1);
}

#[tokio::test]
async fn remove_repacks_remaining_order() {
    let w = World::new().await;
    let mut ids = Vec::new();
    for title in ["A", "B", "C"] {
        let d = w.shared_dashboard(title, &[&w.alice]).await;
        w.dashboards.add_favorite(&w.alice, d.id).await.unwrap();
        ids.push(d.id);
    }

    w.dashboards.remove_favorite(&w.alice, ids[1]).await.unwrap();
    assert_eq!(favorite_ids(&w, w.alice.id).await, vec![(ids[0], 0), (ids[2], 1)]);

    assert_matches!(
        w.dashboards.remove_favorite(&w.alice, ids[1]).await,
        Err(AppError::Core(CoreError::NotFound { entity: "Favorite", .. }))
    );
}

#[tokio::test]
async fn toggle_flips_membership() {
    let w = World::new().await;
    let a = w.shared_dashboard("A", &[&w.alice]).await;
    let b = w.shared_dashboard("B", &[&w.alice]).await;
    w.dashboards.add_favorite(&w.alice, a.id).await.unwrap();

    let on = w.dashboards.toggle_favorite(&w.alice, b.id).await.unwrap();
    assert!(on.is_favorite);
    assert_eq!(favorite_ids(&w, w.alice.id).await, vec![(a.id, 0), (b.id, 1)]);

    let off = w.dashboards.toggle_favorite(&w.alice, a.id).await.unwrap();
    assert!(!off.is_favorite);
    assert_eq!(favorite_ids(&w, w.alice.id).await, vec![(b.id, 0)]);

    assert_matches!(
        w.dashboards.toggle_favorite(&w.bob, a.id).await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reorder_applies_permutation_and_keeps_omitted_at_end() {
    let w = World::new().await;
    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D"] {
        let d = w.shared_dashboard(title, &[&w.alice]).await;
        w.dashboards.add_favorite(&w.alice, d.id).await.unwrap();
        ids.push(d.id);
    }

    let order = w
        .dashboards
        .reorder_favorites(&w.alice, &[ids[3], ids[1]])
        .await
        .unwrap();
    assert_eq!(order, vec![ids[3], ids[1], ids[0], ids[2]]);
    assert_eq!(
        favorite_ids(&w, w.alice.id).await,
        vec![(ids[3], 0), (ids[1], 1), (ids[0], 2), (ids[2], 3)]
    );
}

#[tokio::test]
async fn reorder_with_unknown_or_duplicate_ids_changes_nothing() {
    let w = World::new().await;
    let a = w.shared_dashboard("A", &[&w.alice]).await;
    let b = w.shared_dashboard("B", &[&w.alice]).await;
    w.dashboards.add_favorite(&w.alice, a.id).await.unwrap();
    w.dashboards.add_favorite(&w.alice, b.id).await.unwrap();

    for ordering in [vec![b.id, 9_999], vec![b.id, b.id]] {
        assert_matches!(
            w.dashboards.reorder_favorites(&w.alice, &ordering).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
    assert_eq!(favorite_ids(&w, w.alice.id).await, vec![(a.id, 0), (b.id, 1)]);
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tags_behave_as_a_set() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("A", &[&w.alice]).await;
    w.dashboards.add_favorite(&w.alice, dashboard.id).await.unwrap();

    let tagged = w
        .dashboards
        .tag_favorite(&w.alice, dashboard.id, &["q1".into(), "ops".into()])
        .await
        .unwrap();
    let tagged_again = w
        .dashboards
        .tag_favorite(&w.alice, dashboard.id, &["ops".into(), "daily".into()])
        .await
        .unwrap();
    assert_eq!(tagged.tags.len(), 2);
    assert_eq!(
        tagged_again.tags.iter().collect::<Vec<_>>(),
        vec!["q1", "ops", "daily"]
    );

    let untagged = w
        .dashboards
        .untag_favorite(&w.alice, dashboard.id, &["q1".into(), "absent".into()])
        .await
        .unwrap();
    assert_eq!(untagged.tags.iter().collect::<Vec<_>>(), vec!["ops", "daily"]);
}

#[tokio::test]
async fn tagging_requires_an_existing_favorite_and_tags() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("A", &[&w.alice]).await;

    assert_matches!(
        w.dashboards
            .tag_favorite(&w.alice, dashboard.id, &["q1".into()])
            .await,
        Err(AppError::Core(CoreError::NotFound { entity: "Favorite", .. }))
    );

    w.dashboards.add_favorite(&w.alice, dashboard.id).await.unwrap();
    assert_matches!(
        w.dashboards.tag_favorite(&w.alice, dashboard.id, &[" ".into()]).await,
        Err(AppError::Core(CoreError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// Status and listings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn check_if_favorited_never_fails() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("A", &[&w.alice]).await;

    assert!(!w.dashboards.check_if_favorited(w.alice.id, dashboard.id).await.is_favorited);

    w.dashboards.add_favorite(&w.alice, dashboard.id).await.unwrap();
    let status = w.dashboards.check_if_favorited(w.alice.id, dashboard.id).await;
    assert!(status.is_favorited);
    assert_eq!(status.order, Some(0));
    assert!(status.added_at.is_some());

    // Unknown user and unknown dashboard both read as "not favorited".
    assert!(!w.dashboards.check_if_favorited(9_999, dashboard.id).await.is_favorited);
    assert!(!w.dashboards.check_if_favorited(w.alice.id, 9_999).await.is_favorited);
}

#[tokio::test]
async fn favorite_listing_is_ordered_and_decorated() {
    let w = World::new().await;
    let a = w.shared_dashboard("A", &[&w.alice]).await;
    let b = w.shared_dashboard("B", &[&w.alice]).await;
    w.dashboards.add_favorite(&w.alice, a.id).await.unwrap();
    w.dashboards.add_favorite(&w.alice, b.id).await.unwrap();
    w.dashboards.reorder_favorites(&w.alice, &[b.id, a.id]).await.unwrap();
    w.dashboards
        .tag_favorite(&w.alice, b.id, &["top".into()])
        .await
        .unwrap();

    let listed = w.dashboards.list_favorite_dashboards(&w.alice).await.unwrap();
    assert_eq!(listed.iter().map(|f| f.dashboard.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    assert_eq!(listed[0].favorite_order, 0);
    assert_eq!(listed[0].favorite_tags.iter().collect::<Vec<_>>(), vec!["top"]);
    assert_eq!(listed[0].dashboard.title, "B");
}

#[tokio::test]
async fn favorite_listing_skips_dashboards_no_longer_visible() {
    let w = World::new().await;
    let a = w.shared_dashboard("A", &[&w.alice]).await;
    let b = w.shared_dashboard("B", &[&w.alice]).await;
    w.dashboards.add_favorite(&w.alice, a.id).await.unwrap();
    w.dashboards.add_favorite(&w.alice, b.id).await.unwrap();

    w.dashboards
        .unassign_dashboard(&w.admin, a.id, &[w.alice.id])
        .await
        .unwrap();

    let listed = w.dashboards.list_favorite_dashboards(&w.alice).await.unwrap();
    assert_eq!(listed.iter().map(|f| f.dashboard.id).collect::<Vec<_>>(), vec![b.id]);
}

#[tokio::test]
async fn dashboards_carry_favorite_flag() {
    let w = World::new().await;
    let a = w.shared_dashboard("A", &[&w.alice]).await;
    let b = w.shared_dashboard("B", &[&w.alice]).await;
    w.dashboards.add_favorite(&w.alice, a.id).await.unwrap();

    let views = w
        .dashboards
        .dashboards_with_favorite_status(&w.alice)
        .await
        .unwrap();
    let flags: Vec<_> = views.iter().map(|v| (v.id, v.is_favorite)).collect();
    assert_eq!(flags, vec![(b.id, Some(false)), (a.id, Some(true))]);
}

// ---------------------------------------------------------------------------
// Most favorited
// ---------------------------------------------------------------------------

#[tokio::test]
async fn most_favorited_ranks_within_company() {
    let w = World::new().await;
    let a = w.shared_dashboard("A", &[&w.alice, &w.bob]).await;
    let b = w.shared_dashboard("B", &[&w.alice, &w.bob]).await;
    let c = w.shared_dashboard("C", &[&w.alice]).await;
    let foreign = w.dashboard(&w.other_admin, "Foreign", Department::Sales).await;
    w.store
        .add_access_users(&[foreign.id], &[w.carol.id].into())
        .await
        .unwrap();

    w.dashboards.add_favorite(&w.alice, c.id).await.unwrap();
    w.dashboards.add_favorite(&w.alice, b.id).await.unwrap();
    w.dashboards.add_favorite(&w.bob, b.id).await.unwrap();
    w.dashboards.add_favorite(&w.alice, a.id).await.unwrap();
    w.dashboards.add_favorite(&w.carol, foreign.id).await.unwrap();

    let ranked = w.dashboards.most_favorited_dashboards(&w.admin, None).await.unwrap();
    let counts: Vec<_> = ranked.iter().map(|r| (r.dashboard.id, r.favorite_count)).collect();
    // Ties keep first-favorited order.
    assert_eq!(counts, vec![(b.id, 2), (c.id, 1), (a.id, 1)]);

    let top = w.dashboards.most_favorited_dashboards(&w.admin, Some(1)).await.unwrap();
    assert_eq!(top.len(), 1);

    // A SUPER_ADMIN without a company ranks globally.
    let global = w.dashboards.most_favorited_dashboards(&w.root, None).await.unwrap();
    assert_eq!(global.len(), 4);
}

#[tokio::test]
async fn most_favorited_is_admin_only() {
    let w = World::new().await;
    assert_matches!(
        w.dashboards.most_favorited_dashboards(&w.alice, None).await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );
}
