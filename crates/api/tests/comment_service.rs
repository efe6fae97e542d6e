//! Service-level tests for threaded comments and their notification fan-out.

mod common;

use assert_matches::assert_matches;
use common::World;
use dashshare_api::error::AppError;
use dashshare_api::services::CreateCommentRequest;
use dashshare_core::error::CoreError;
use dashshare_core::notification_types::NotificationType;
use dashshare_core::types::DbId;
use dashshare_db::models::comment::CreateComment;
use dashshare_db::models::dashboard::Dashboard;
use dashshare_db::models::user::User;
use dashshare_db::Store;

async fn comment(w: &World, author: &User, dashboard: &Dashboard, message: &str, parent_id: Option<DbId>) -> DbId {
    w.dashboards
        .create_comment(
            author,
            dashboard.id,
            &CreateCommentRequest {
                message: message.to_string(),
                parent_id,
            },
        )
        .await
        .unwrap()
        .comment
        .id
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comment_notifies_creator_and_access_list_except_author() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice, &w.bob]).await;

    let created = w
        .dashboards
        .create_comment(
            &w.alice,
            dashboard.id,
            &CreateCommentRequest {
                message: "  numbers look off  ".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.comment.message, "numbers look off");
    assert_eq!(created.author.as_ref().map(|a| a.id), Some(w.alice.id));
    assert!(!created.comment.edited);

    assert!(w.inbox(&w.alice).await.is_empty());
    for recipient in [&w.admin, &w.bob] {
        let inbox = w.inbox(recipient).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].notification_type, NotificationType::Comment);
        assert_eq!(inbox[0].message, "Alice commented on \"Revenue\"");
        assert_eq!(inbox[0].comment_id, Some(created.comment.id));
    }

    let mut pushed = w.sink.recipients();
    pushed.sort();
    let mut expected = vec![w.admin.id, w.bob.id];
    expected.sort();
    assert_eq!(pushed, expected);
}

#[tokio::test]
async fn mentions_notify_company_members_case_insensitively() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice]).await;

    comment(&w, &w.alice, &dashboard, "@bob @BOB @alice @carol please check", None).await;

    // Bob: one MENTION (deduplicated). Carol is in another company.
    let bob_inbox = w.inbox(&w.bob).await;
    assert_eq!(bob_inbox.len(), 1);
    assert_eq!(bob_inbox[0].notification_type, NotificationType::Mention);
    assert_eq!(bob_inbox[0].message, "Alice mentioned you in a comment on \"Revenue\"");
    assert!(w.inbox(&w.carol).await.is_empty());
    // Self-mention is skipped; the creator gets only the COMMENT notification.
    assert!(w.inbox(&w.alice).await.is_empty());
    let admin_inbox = w.inbox(&w.admin).await;
    assert_eq!(admin_inbox.len(), 1);
    assert_eq!(admin_inbox[0].notification_type, NotificationType::Comment);
}

#[tokio::test]
async fn companyless_sender_mentions_only_companyless_users() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice]).await;

    comment(&w, &w.root, &dashboard, "fyi @Carol and @Bob", None).await;

    // Carol (Globex) and Bob (Acme) both belong to a company; root does not.
    assert!(w.inbox(&w.carol).await.is_empty());
    assert!(w.inbox(&w.bob).await.is_empty());
    let alice_kinds: Vec<_> = w
        .inbox(&w.alice)
        .await
        .into_iter()
        .map(|n| n.notification_type)
        .collect();
    assert_eq!(alice_kinds, vec![NotificationType::Comment]);
}

#[tokio::test]
async fn mentioned_recipient_on_access_list_gets_both_kinds() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice, &w.bob]).await;

    comment(&w, &w.alice, &dashboard, "thanks @Bob", None).await;

    let kinds: Vec<_> = w
        .inbox(&w.bob)
        .await
        .into_iter()
        .map(|n| n.notification_type)
        .collect();
    // Newest first: the mention is sent after the comment fan-out.
    assert_eq!(kinds, vec![NotificationType::Mention, NotificationType::Comment]);
}

#[tokio::test]
async fn create_requires_access_and_valid_message() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice]).await;
    let request = |message: &str| CreateCommentRequest {
        message: message.to_string(),
        parent_id: None,
    };

    assert_matches!(
        w.dashboards.create_comment(&w.bob, dashboard.id, &request("hi")).await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );
    assert_matches!(
        w.dashboards.create_comment(&w.alice, dashboard.id, &request("   ")).await,
        Err(AppError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        w.dashboards.create_comment(&w.alice, 9_999, &request("hi")).await,
        Err(AppError::Core(CoreError::NotFound { .. }))
    );
    assert_eq!(w.store.comment_count().await, 0);
}

#[tokio::test]
async fn parent_must_belong_to_the_same_dashboard() {
    let w = World::new().await;
    let revenue = w.shared_dashboard("Revenue", &[&w.alice]).await;
    let costs = w.shared_dashboard("Costs", &[&w.alice]).await;
    let foreign_parent = comment(&w, &w.alice, &costs, "on costs", None).await;

    for parent_id in [foreign_parent, 9_999] {
        let err = w
            .dashboards
            .create_comment(
                &w.alice,
                revenue.id,
                &CreateCommentRequest {
                    message: "reply".into(),
                    parent_id: Some(parent_id),
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Validation(msg)) if msg == "Invalid parent comment");
    }
    assert_eq!(w.store.comment_count().await, 1);
}

#[tokio::test]
async fn comment_notification_failure_fails_the_request() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice]).await;
    w.store.set_fail_notifications(true);

    let result = w
        .dashboards
        .create_comment(
            &w.alice,
            dashboard.id,
            &CreateCommentRequest {
                message: "hello".into(),
                parent_id: None,
            },
        )
        .await;

    assert_matches!(result, Err(AppError::Database(_)));
    // The comment itself was written before the fan-out failed.
    assert_eq!(w.store.comment_count().await, 1);
    assert_eq!(w.store.notification_count().await, 0);
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_threads_newest_roots_with_oldest_first_replies() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice, &w.bob]).await;

    let first = comment(&w, &w.alice, &dashboard, "first", None).await;
    let reply_1 = comment(&w, &w.bob, &dashboard, "reply 1", Some(first)).await;
    let second = comment(&w, &w.bob, &dashboard, "second", None).await;
    let reply_2 = comment(&w, &w.admin, &dashboard, "reply 2", Some(first)).await;
    let nested = comment(&w, &w.alice, &dashboard, "nested", Some(reply_1)).await;

    let threads = w.dashboards.list_comments(&w.bob, dashboard.id).await.unwrap();

    let roots: Vec<_> = threads.iter().map(|t| t.comment.id).collect();
    assert_eq!(roots, vec![second, first]);
    let replies: Vec<_> = threads[1].replies.iter().map(|r| r.comment.id).collect();
    assert_eq!(replies, vec![reply_1, reply_2, nested]);
    assert!(threads[1].replies.iter().all(|r| r.replies.is_empty()));
    assert_eq!(
        threads[1].replies[1].author.as_ref().map(|a| a.id),
        Some(w.admin.id)
    );

    assert_matches!(
        w.dashboards.list_comments(&w.dave, dashboard.id).await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );
}

#[tokio::test]
async fn deep_reply_chain_lists_as_one_flat_thread() {
    const DEPTH: usize = 20_000;
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice]).await;
    let root = comment(&w, &w.alice, &dashboard, "root", None).await;

    let mut parent = root;
    for i in 0..DEPTH {
        parent = w
            .store
            .create_comment(&CreateComment {
                dashboard_id: dashboard.id,
                user_id: w.alice.id,
                message: format!("reply {i}"),
                parent_id: Some(parent),
            })
            .await
            .unwrap()
            .id;
    }

    let threads = w.dashboards.list_comments(&w.alice, dashboard.id).await.unwrap();

    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].comment.id, root);
    assert_eq!(threads[0].replies.len(), DEPTH);
    assert_eq!(threads[0].replies.last().map(|r| r.comment.id), Some(parent));
    assert!(serde_json::to_string(&threads).is_ok());
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn only_the_author_edits() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice]).await;
    let id = comment(&w, &w.alice, &dashboard, "draft", None).await;

    assert_matches!(
        w.dashboards.update_comment(&w.admin, id, "hijack").await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );

    let updated = w.dashboards.update_comment(&w.alice, id, "final").await.unwrap();
    assert_eq!(updated.message, "final");
    assert!(updated.edited);

    assert_matches!(
        w.dashboards.update_comment(&w.alice, 9_999, "x").await,
        Err(AppError::Core(CoreError::NotFound { entity: "Comment", .. }))
    );
}

#[tokio::test]
async fn delete_removes_the_whole_reply_tree() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice, &w.bob]).await;

    let root = comment(&w, &w.alice, &dashboard, "root", None).await;
    let reply = comment(&w, &w.bob, &dashboard, "reply", Some(root)).await;
    let grandchild = comment(&w, &w.alice, &dashboard, "grandchild", Some(reply)).await;
    let other = comment(&w, &w.bob, &dashboard, "other", None).await;

    w.dashboards.delete_comment(&w.alice, root).await.unwrap();

    for id in [root, reply, grandchild] {
        assert!(w.store.find_comment(id).await.unwrap().is_none());
    }
    assert!(w.store.find_comment(other).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_permissions() {
    let w = World::new().await;
    let dashboard = w.shared_dashboard("Revenue", &[&w.alice, &w.bob]).await;
    let by_alice = comment(&w, &w.alice, &dashboard, "mine", None).await;
    let by_bob = comment(&w, &w.bob, &dashboard, "bob's", None).await;
    let by_bob_again = comment(&w, &w.bob, &dashboard, "bob's again", None).await;

    // Another USER and a foreign ADMIN may not delete.
    assert_matches!(
        w.dashboards.delete_comment(&w.alice, by_bob).await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );
    assert_matches!(
        w.dashboards.delete_comment(&w.other_admin, by_bob).await,
        Err(AppError::Core(CoreError::Forbidden(_)))
    );

    w.dashboards.delete_comment(&w.alice, by_alice).await.unwrap();
    w.dashboards.delete_comment(&w.admin, by_bob).await.unwrap();
    w.dashboards.delete_comment(&w.root, by_bob_again).await.unwrap();
    assert_eq!(w.store.comment_count().await, 0);
}
