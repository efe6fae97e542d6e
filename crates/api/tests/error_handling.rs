//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly; no server is involved.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use dashshare_api::error::AppError;
use dashshare_core::error::CoreError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_names_the_entity() {
    let (status, json) = error_to_response(AppError::not_found("Comment", 42)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["message"], "Comment not found");
}

#[tokio::test]
async fn validation_and_forbidden_keep_their_message() {
    let (status, json) = error_to_response(AppError::validation("Invalid parent comment")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Invalid parent comment");

    let (status, json) = error_to_response(AppError::forbidden("Access denied")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn unauthorized_maps_to_401() {
    let err = AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()));
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn storage_errors_are_sanitized() {
    let err = AppError::Database(sqlx::Error::Protocol("connection reset by peer".into()));
    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["message"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, _) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
