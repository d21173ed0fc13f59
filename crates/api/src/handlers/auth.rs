//! Handlers for the `/auth` resource (signup, user login, admin login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use snapvote_core::error::CoreError;
use snapvote_core::roles::{ROLE_ADMIN, ROLE_USER};
use snapvote_core::types::DbId;
use snapvote_db::models::user::{CreateUser, UserResponse};
use snapvote_db::repositories::{AdminRepo, UserRepo};
use validator::Validate;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{is_unique_violation, validate_input, AppError, AppResult};
use crate::state::AppState;

/// Single message for every credential failure. Unknown email and wrong
/// password are indistinguishable from the outside, so the endpoint
/// cannot be used to enumerate accounts.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Request body for `POST /auth/login` and `POST /auth/admin/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: CallerInfo,
}

/// Public caller info embedded in [`LoginResponse`].
#[derive(Debug, Serialize)]
pub struct CallerInfo {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/signup
///
/// Create a user account. The password is Argon2id-hashed before
/// storage and excluded from the response; a duplicate email rides the
/// `uq_users_email` constraint into a conflict.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_input(&input)?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: input.name,
        email: input.email,
        password_hash: hashed,
    };

    let user = UserRepo::create(&state.pool, &create_dto)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_users_email") {
                AppError::Core(CoreError::Conflict("Email is already registered".into()))
            } else {
                AppError::Database(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /auth/login
///
/// Authenticate a user with email + password. Returns a bearer token
/// whose subject is the user's id.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_input(&input)?;

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    let response = build_login_response(
        &state,
        user.id,
        user.username,
        user.email,
        ROLE_USER,
    )?;
    Ok(Json(response))
}

/// POST /auth/admin/login
///
/// Authenticate an admin against the `admins` table. The issued token
/// carries the admin role claim; admin routes additionally re-verify the
/// admin row on every request.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_input(&input)?;

    let admin = AdminRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    let password_valid = verify_password(&input.password, &admin.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    let response = build_login_response(
        &state,
        admin.id,
        admin.username,
        admin.email,
        ROLE_ADMIN,
    )?;
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue a token and assemble the login response.
fn build_login_response(
    state: &AppState,
    id: DbId,
    username: String,
    email: String,
    role: &str,
) -> AppResult<LoginResponse> {
    let token = generate_token(id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(LoginResponse {
        token,
        expires_in: state.config.jwt.token_expiry_hours * 3600,
        user: CallerInfo {
            id,
            username,
            email,
            role: role.to_string(),
        },
    })
}
