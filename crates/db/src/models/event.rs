//! Event entity model and DTOs.

use serde::Serialize;
use snapvote_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full event row from the `events` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: DbId,
    pub name: String,
    pub description: String,
    /// Price in minor currency units.
    pub price: i64,
    pub image_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new event.
#[derive(Debug)]
pub struct CreateEvent {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image_url: String,
}

/// DTO for a full event update (PUT semantics: every field replaced).
#[derive(Debug)]
pub struct UpdateEvent {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image_url: String,
}
