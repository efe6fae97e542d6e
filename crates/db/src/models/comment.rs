//! Comment entity model, DTOs and threaded read view.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use dashshare_core::types::{DbId, Timestamp};

use super::user::UserSummary;

/// A row from the `comments` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: DbId,
    pub dashboard_id: DbId,
    pub user_id: DbId,
    pub message: String,
    pub parent_id: Option<DbId>,
    pub edited: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub dashboard_id: DbId,
    pub user_id: DbId,
    pub message: String,
    pub parent_id: Option<DbId>,
}

/// A comment with its author resolved and, for top-level comments, every
/// reply in its thread. Replies never carry replies of their own.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserSummary>,
    pub replies: Vec<CommentView>,
}
