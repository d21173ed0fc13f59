//! Admin authorization extractor.
//!
//! Admin privilege is decided by the `admins` table, not by the token
//! alone: the extractor validates the bearer token, requires the admin
//! role claim, then confirms the admin row still exists. A failed lookup
//! is a 500 -- it must never be reported as an ordinary denial, because
//! "the privilege check could not run" and "not an admin" are different
//! answers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use snapvote_core::error::CoreError;
use snapvote_core::roles::ROLE_ADMIN;
use snapvote_db::models::admin::Admin;
use snapvote_db::repositories::AdminRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires an authenticated admin. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     // admin is the verified row from the admins table
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub Admin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        if caller.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin privilege required".into(),
            )));
        }

        // Database errors propagate as 500 here; only a definitive
        // "no such row" is a denial.
        let admin = AdminRepo::find_by_id(&state.pool, caller.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Forbidden("Admin privilege required".into()))
            })?;

        Ok(RequireAdmin(admin))
    }
}
