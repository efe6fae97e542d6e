//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dashshare_core::error::CoreError;
use dashshare_core::roles::Role;
use dashshare_core::types::DbId;
use dashshare_db::models::user::User;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// The authenticated, active user behind the request's Bearer token.
///
/// The token only identifies the user; role and company come from the
/// stored record, so a role change takes effect on the next request.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
    /// The full stored record.
    pub user: User,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            user,
        }
    }
}

/// Validate a raw token and load the active user it names.
///
/// Shared by the header extractor and the WebSocket handshake.
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<User> {
    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "User not found or inactive".into(),
            ))
        })?;

    Ok(user)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let user = authenticate(state, token).await?;
        Ok(AuthUser::from(user))
    }
}
