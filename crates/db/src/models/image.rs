//! Image entity model and DTOs.

use serde::Serialize;
use snapvote_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full image row from the `images` table.
///
/// `votes` mirrors the number of `image_votes` rows for this image; the
/// two are updated together inside one transaction.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Image {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub image_url: String,
    pub votes: i32,
    pub created_at: Timestamp,
}

/// Outcome of an atomic vote attempt.
#[derive(Debug)]
pub enum VoteOutcome {
    /// The vote was recorded; carries the image with its updated count.
    Recorded(Image),
    /// The voter already appears in this image's voter record.
    AlreadyVoted,
    /// No image with the given id exists.
    ImageNotFound,
}
