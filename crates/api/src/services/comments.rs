//! Threaded comments on dashboards.

use std::collections::{BTreeSet, HashMap};

use dashshare_core::access::can_delete_comment;
use dashshare_core::types::DbId;
use dashshare_core::validation::validate_comment_message;
use dashshare_db::models::comment::{Comment, CommentView, CreateComment};
use dashshare_db::models::user::{User, UserSummary};
use serde::Deserialize;

use super::DashboardService;
use crate::error::{AppError, AppResult};

const COMMENT_ACCESS_DENIED: &str = "You do not have access to this dashboard";

/// Body of `POST /dashboards/{id}/comments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub message: String,
    pub parent_id: Option<DbId>,
}

impl DashboardService {
    /// Top-level comments newest first, each carrying every reply in its
    /// thread, flattened one level deep, in the order they were written.
    pub async fn list_comments(&self, actor: &User, dashboard_id: DbId) -> AppResult<Vec<CommentView>> {
        self.load_accessible(dashboard_id, actor, COMMENT_ACCESS_DENIED)
            .await?;

        let comments = self.store.list_comments(dashboard_id).await?;
        let author_ids: Vec<DbId> = comments
            .iter()
            .map(|c| c.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let authors = self.store.user_summaries(&author_ids).await?;

        Ok(thread_comments(comments, &authors))
    }

    /// Post a comment or a reply, then notify the dashboard's audience and
    /// anyone mentioned. A failed notification write fails the request
    /// after the comment itself has been stored.
    pub async fn create_comment(
        &self,
        actor: &User,
        dashboard_id: DbId,
        input: &CreateCommentRequest,
    ) -> AppResult<CommentView> {
        let dashboard = self
            .load_accessible(dashboard_id, actor, COMMENT_ACCESS_DENIED)
            .await?;
        validate_comment_message(&input.message).map_err(AppError::validation)?;

        if let Some(parent_id) = input.parent_id {
            let parent = self.store.find_comment(parent_id).await?;
            if !parent.is_some_and(|p| p.dashboard_id == dashboard_id) {
                return Err(AppError::validation("Invalid parent comment"));
            }
        }

        let comment = self
            .store
            .create_comment(&CreateComment {
                dashboard_id,
                user_id: actor.id,
                message: input.message.trim().to_string(),
                parent_id: input.parent_id,
            })
            .await?;

        tracing::info!(
            comment_id = comment.id,
            dashboard_id,
            user_id = actor.id,
            parent_id = ?comment.parent_id,
            "Comment created",
        );

        self.notifications
            .send_comment_notifications(&dashboard, &comment, actor)
            .await?;
        self.notifications
            .send_mention_notifications(&dashboard, &comment, actor)
            .await?;

        Ok(CommentView {
            comment,
            author: Some(UserSummary::from(actor)),
            replies: Vec::new(),
        })
    }

    /// Replace a comment's text. Only its author may edit it.
    pub async fn update_comment(
        &self,
        actor: &User,
        comment_id: DbId,
        message: &str,
    ) -> AppResult<Comment> {
        let comment = self.load_comment(comment_id).await?;
        if comment.user_id != actor.id {
            return Err(AppError::forbidden("You can only edit your own comments"));
        }
        validate_comment_message(message).map_err(AppError::validation)?;

        let updated = self
            .store
            .update_comment_message(comment_id, message.trim())
            .await?
            .ok_or_else(|| AppError::not_found("Comment", comment_id))?;

        tracing::info!(comment_id, user_id = actor.id, "Comment edited");
        Ok(updated)
    }

    /// Delete a comment and every reply beneath it, at any depth.
    pub async fn delete_comment(&self, actor: &User, comment_id: DbId) -> AppResult<()> {
        let comment = self.load_comment(comment_id).await?;
        let dashboard_company = self
            .store
            .find_dashboard(comment.dashboard_id)
            .await?
            .and_then(|d| d.company_id);

        if !can_delete_comment(comment.user_id, dashboard_company, actor.principal()) {
            return Err(AppError::forbidden(
                "You do not have permission to delete this comment",
            ));
        }

        let deleted = self.store.delete_comment_tree(comment_id).await?;
        tracing::info!(comment_id, deleted, user_id = actor.id, "Comment deleted");
        Ok(())
    }

    async fn load_comment(&self, id: DbId) -> AppResult<Comment> {
        self.store
            .find_comment(id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment", id))
    }
}

/// Arrange a dashboard's comments (newest first) into threads one level
/// deep.
///
/// Roots stay newest first. Every descendant of a root, however deeply it
/// was nested, is listed under that root oldest first with no replies of its
/// own. Replies whose chain does not reach a root in `comments` are dropped.
fn thread_comments(comments: Vec<Comment>, authors: &[UserSummary]) -> Vec<CommentView> {
    let authors: HashMap<DbId, &UserSummary> = authors.iter().map(|a| (a.id, a)).collect();
    let view = |comment: Comment| CommentView {
        author: authors.get(&comment.user_id).map(|a| (*a).clone()),
        comment,
        replies: Vec::new(),
    };

    let (roots, mut replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|c| c.parent_id.is_none());
    replies.reverse();

    let root_of = resolve_roots(&roots, &replies);
    let mut threads: HashMap<DbId, Vec<CommentView>> = HashMap::new();
    for reply in replies {
        if let Some(&root) = root_of.get(&reply.id) {
            threads.entry(root).or_default().push(view(reply));
        }
    }

    roots
        .into_iter()
        .map(|root| {
            let replies = threads.remove(&root.id).unwrap_or_default();
            CommentView { replies, ..view(root) }
        })
        .collect()
}

/// Map each reply id to the top-level comment its parent chain ends at.
/// Chains are walked iteratively and every id on a walk is memoised.
fn resolve_roots(roots: &[Comment], replies: &[Comment]) -> HashMap<DbId, DbId> {
    let parent_of: HashMap<DbId, DbId> = replies
        .iter()
        .filter_map(|c| c.parent_id.map(|p| (c.id, p)))
        .collect();
    let mut resolved: HashMap<DbId, Option<DbId>> =
        roots.iter().map(|r| (r.id, Some(r.id))).collect();

    let mut path = Vec::new();
    for reply in replies {
        let mut current = reply.id;
        let root = loop {
            if let Some(&known) = resolved.get(&current) {
                break known;
            }
            match parent_of.get(&current) {
                // A walk longer than the reply count can only be a cycle.
                Some(&parent) if path.len() <= parent_of.len() => {
                    path.push(current);
                    current = parent;
                }
                _ => break None,
            }
        };
        for id in path.drain(..) {
            resolved.insert(id, root);
        }
    }

    resolved
        .into_iter()
        .filter_map(|(id, root)| root.map(|r| (id, r)))
        .collect()
}
