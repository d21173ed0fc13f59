//! Registration entity model and DTOs.

use serde::Serialize;
use snapvote_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use crate::models::image::Image;

/// Full registration row from the `registrations` table.
///
/// At most one row exists per (user_id, event_id) pair, enforced by
/// `uq_registrations_user_event`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Registration {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    /// One of the `snapvote_core::registration` payment status values.
    pub payment_status: String,
    /// Number of images uploaded under this registration (0..=3).
    pub image_count: i32,
    pub created_at: Timestamp,
}

/// Outcome of an atomic quota-guarded image upload.
#[derive(Debug)]
pub enum AddImageOutcome {
    /// The image was created and the registration counter incremented.
    Created(Image),
    /// The caller holds no registration for the event.
    NotRegistered,
    /// The registration already carries the maximum number of images.
    QuotaExceeded,
}
