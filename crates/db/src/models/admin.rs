//! Admin entity model and DTOs.

use serde::Serialize;
use snapvote_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full admin row from the `admins` table.
///
/// Contains the password hash -- never serialize this to API responses
/// directly; use [`AdminResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
}

/// Safe admin representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct AdminResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub created_at: Timestamp,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            created_at: admin.created_at,
        }
    }
}

/// DTO for creating a new admin.
#[derive(Debug)]
pub struct CreateAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
