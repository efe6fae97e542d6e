//! Success envelope shared by every API handler.
//!
//! Responses take the shape `{ "success": true, "message"?: ..., "data": ... }`.
//! Errors use the matching `{ "success": false, ... }` shape produced by
//! [`crate::error::AppError`].

use serde::Serialize;

/// Standard success envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}
