//! Repository tests against a real Postgres database.
//!
//! Each test gets a fresh database with the crate migrations applied.
//! They need `DATABASE_URL` and are ignored by default:
//! `cargo test -p dashshare-db -- --ignored`.

use std::collections::BTreeSet;

use dashshare_core::departments::Department;
use dashshare_core::notification_types::NotificationType;
use dashshare_core::roles::Role;
use dashshare_db::models::comment::CreateComment;
use dashshare_db::models::company::CreateCompany;
use dashshare_db::models::dashboard::{CreateDashboard, DashboardFilter, UpdateDashboard};
use dashshare_db::models::notification::NewNotification;
use dashshare_db::models::user::{CreateUser, User};
use dashshare_db::repositories::{
    CommentRepo, CompanyRepo, DashboardRepo, FavoriteRepo, NotificationRepo, UserRepo,
};
use indexmap::IndexSet;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn company(pool: &PgPool, name: &str) -> i64 {
    CompanyRepo::create(
        pool,
        &CreateCompany {
            name: name.to_string(),
            subdomain: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn user(pool: &PgPool, email: &str, role: Role, company_id: Option<i64>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: Some(email.split('@').next().unwrap().to_string()),
            role,
            company_id,
            invited_by: None,
            is_active: true,
        },
    )
    .await
    .unwrap()
}

async fn dashboard(pool: &PgPool, admin: &User, title: &str) -> i64 {
    DashboardRepo::create(
        pool,
        &CreateDashboard {
            title: title.to_string(),
            embed_url: "https://bi.example.com/embed/1".to_string(),
            description: None,
            department: Department::Sales,
            tags: IndexSet::new(),
            created_by: admin.id,
            company_id: admin.company_id,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Users and dashboards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn user_role_round_trips(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;

    let found = UserRepo::find_by_id(&pool, admin.id).await.unwrap().unwrap();
    assert_eq!(found.role, Role::Admin);
    assert_eq!(found.company_id, Some(acme));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn super_admin_with_company_is_rejected(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let result = UserRepo::create(
        &pool,
        &CreateUser {
            email: "root@acme.io".to_string(),
            name: None,
            role: Role::SuperAdmin,
            company_id: Some(acme),
            invited_by: None,
            is_active: true,
        },
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn mention_lookup_is_case_insensitive(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let bob = user(&pool, "Bob@acme.io", Role::User, Some(acme)).await;

    let found = UserRepo::find_active_by_names(&pool, &["bob".to_string()], Some(acme))
        .await
        .unwrap();
    assert_eq!(found.iter().map(|u| u.id).collect::<Vec<_>>(), vec![bob.id]);

    let other = company(&pool, "Other").await;
    let none = UserRepo::find_active_by_names(&pool, &["bob".to_string()], Some(other))
        .await
        .unwrap();
    assert!(none.is_empty());

    let companyless = UserRepo::find_active_by_names(&pool, &["bob".to_string()], None)
        .await
        .unwrap();
    assert!(companyless.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn access_list_is_a_set(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;
    let bob = user(&pool, "bob@acme.io", Role::User, Some(acme)).await;
    let id = dashboard(&pool, &admin, "Revenue").await;

    let users = BTreeSet::from([bob.id]);
    assert_eq!(DashboardRepo::add_access_users(&pool, &[id], &users).await.unwrap(), 1);
    assert_eq!(DashboardRepo::add_access_users(&pool, &[id], &users).await.unwrap(), 0);

    let found = DashboardRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(found.access_users, users);

    let visible = DashboardRepo::list(
        &pool,
        &DashboardFilter {
            access_user: Some(bob.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(visible.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn update_applies_only_given_fields(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;
    let id = dashboard(&pool, &admin, "Revenue").await;

    let updated = DashboardRepo::update(
        &pool,
        id,
        &UpdateDashboard {
            title: Some("Revenue 2026".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.title, "Revenue 2026");
    assert_eq!(updated.embed_url, "https://bi.example.com/embed/1");
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn favorite_removal_repacks_order(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;
    let a = dashboard(&pool, &admin, "A").await;
    let b = dashboard(&pool, &admin, "B").await;
    let c = dashboard(&pool, &admin, "C").await;

    for id in [a, b, c] {
        FavoriteRepo::append(&pool, admin.id, id).await.unwrap();
    }
    assert!(FavoriteRepo::append(&pool, admin.id, a).await.is_err());

    assert!(FavoriteRepo::remove(&pool, admin.id, a).await.unwrap());
    let left = FavoriteRepo::list_for_user(&pool, admin.id).await.unwrap();
    let pairs: Vec<(i64, i32)> = left.iter().map(|f| (f.dashboard_id, f.order)).collect();
    assert_eq!(pairs, vec![(b, 0), (c, 1)]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn deleting_dashboard_repacks_every_list(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;
    let a = dashboard(&pool, &admin, "A").await;
    let b = dashboard(&pool, &admin, "B").await;
    FavoriteRepo::append(&pool, admin.id, a).await.unwrap();
    FavoriteRepo::append(&pool, admin.id, b).await.unwrap();

    assert_eq!(FavoriteRepo::remove_dashboard(&pool, a).await.unwrap(), 1);
    let left = FavoriteRepo::list_for_user(&pool, admin.id).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].order, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn reorder_and_counts(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;
    let bob = user(&pool, "bob@acme.io", Role::User, Some(acme)).await;
    let a = dashboard(&pool, &admin, "A").await;
    let b = dashboard(&pool, &admin, "B").await;
    FavoriteRepo::append(&pool, admin.id, a).await.unwrap();
    FavoriteRepo::append(&pool, admin.id, b).await.unwrap();
    FavoriteRepo::append(&pool, bob.id, b).await.unwrap();

    FavoriteRepo::set_order(&pool, admin.id, &[b, a]).await.unwrap();
    let ordered: Vec<i64> = FavoriteRepo::list_for_user(&pool, admin.id)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.dashboard_id)
        .collect();
    assert_eq!(ordered, vec![b, a]);

    let mut counts = FavoriteRepo::counts(&pool, Some(acme)).await.unwrap();
    counts.sort();
    assert_eq!(counts, vec![(a, 1), (b, 2)]);
}

// ---------------------------------------------------------------------------
// Comments and notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn comment_tree_delete_is_recursive(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;
    let id = dashboard(&pool, &admin, "A").await;

    let mut parent_id = None;
    let mut ids = Vec::new();
    for message in ["root", "reply", "grandchild"] {
        let c = CommentRepo::create(
            &pool,
            &CreateComment {
                dashboard_id: id,
                user_id: admin.id,
                message: message.to_string(),
                parent_id,
            },
        )
        .await
        .unwrap();
        parent_id = Some(c.id);
        ids.push(c.id);
    }

    assert_eq!(CommentRepo::delete_tree(&pool, ids[0]).await.unwrap(), 3);
    assert!(CommentRepo::list_for_dashboard(&pool, id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn notifications_are_scoped_to_recipient(pool: PgPool) {
    let acme = company(&pool, "Acme").await;
    let admin = user(&pool, "ann@acme.io", Role::Admin, Some(acme)).await;
    let bob = user(&pool, "bob@acme.io", Role::User, Some(acme)).await;
    let dashboard_id = dashboard(&pool, &admin, "Revenue").await;

    let created = NotificationRepo::create(
        &pool,
        &NewNotification {
            recipient_id: bob.id,
            sender_id: admin.id,
            notification_type: NotificationType::DashboardAssigned,
            message: "ann assigned you to dashboard \"Revenue\"".to_string(),
            dashboard_id: Some(dashboard_id),
            comment_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(created.sender.email, "ann@acme.io");
    assert_eq!(created.dashboard.as_ref().map(|d| d.title.as_str()), Some("Revenue"));

    assert!(NotificationRepo::mark_read(&pool, created.id, admin.id)
        .await
        .unwrap()
        .is_none());
    let read = NotificationRepo::mark_read(&pool, created.id, bob.id)
        .await
        .unwrap()
        .unwrap();
    assert!(read.is_read);
    assert_eq!(NotificationRepo::count_for_recipient(&pool, bob.id, true).await.unwrap(), 0);

    // The reference outlives its dashboard.
    DashboardRepo::delete(&pool, dashboard_id).await.unwrap();
    let stale = NotificationRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(stale.dashboard_id, Some(dashboard_id));
    assert!(stale.dashboard.is_none());

    assert!(!NotificationRepo::delete(&pool, created.id, admin.id).await.unwrap());
    assert!(NotificationRepo::delete(&pool, created.id, bob.id).await.unwrap());
}
