//! Handlers for the `/admin` resource (admin account management).
//!
//! All handlers require a verified admin via [`RequireAdmin`]. The first
//! admin is seeded at startup (see the binary entrypoint); after that,
//! admins create further admins here.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use snapvote_core::error::CoreError;
use snapvote_db::models::admin::{AdminResponse, CreateAdmin};
use snapvote_db::repositories::AdminRepo;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{is_unique_violation, validate_input, AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// Request body for `POST /admin`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// POST /admin
///
/// Create another admin account. Validation and the privilege check run
/// before any write; a duplicate email rides `uq_admins_email` into a
/// conflict.
pub async fn create_admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateAdminRequest>,
) -> AppResult<(StatusCode, Json<AdminResponse>)> {
    validate_input(&input)?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateAdmin {
        username: input.username,
        email: input.email,
        password_hash: hashed,
    };

    let admin = AdminRepo::create(&state.pool, &create_dto)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_admins_email") {
                AppError::Core(CoreError::Conflict("Email is already registered".into()))
            } else {
                AppError::Database(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(AdminResponse::from(admin))))
}
