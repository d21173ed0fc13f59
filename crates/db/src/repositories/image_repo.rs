//! Repository for the `images` and `image_votes` tables.
//!
//! The voter record is one `image_votes` row per (image, voter);
//! `uq_image_votes_image_voter` is the deduplication primitive. The
//! denormalized `images.votes` counter is only ever incremented in the
//! same transaction as a successful voter-record insert, which keeps
//! `votes == COUNT(image_votes)` at all times.

use snapvote_core::leaderboard::VoteOrder;
use snapvote_core::types::DbId;
use sqlx::PgPool;

use crate::models::image::{Image, VoteOutcome};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, event_id, image_url, votes, created_at";

/// Provides image lookup, event listings, leaderboards, and the atomic
/// vote operation.
pub struct ImageRepo;

impl ImageRepo {
    /// Find an image by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every image uploaded for an event, oldest first.
    pub async fn list_for_event(pool: &PgPool, event_id: DbId) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE event_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Rank an event's images by vote count in the given direction.
    ///
    /// Ties break by creation time then id, so the ordering is stable
    /// regardless of direction.
    pub async fn leaderboard(
        pool: &PgPool,
        event_id: DbId,
        order: VoteOrder,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images WHERE event_id = $1
             ORDER BY votes {}, created_at ASC, id ASC",
            order.sql_keyword()
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// Atomically record a vote by `voter_id` on `image_id`.
    ///
    /// The voter-record insert and the counter increment are one
    /// transaction keyed on `uq_image_votes_image_voter`: a duplicate
    /// vote -- even one racing this call -- inserts zero rows and the
    /// counter is left untouched.
    pub async fn vote(
        pool: &PgPool,
        image_id: DbId,
        voter_id: DbId,
    ) -> Result<VoteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let image: Option<(DbId,)> = sqlx::query_as("SELECT id FROM images WHERE id = $1")
            .bind(image_id)
            .fetch_optional(&mut *tx)
            .await?;
        if image.is_none() {
            return Ok(VoteOutcome::ImageNotFound);
        }

        let inserted = sqlx::query(
            "INSERT INTO image_votes (image_id, voter_id) VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_image_votes_image_voter DO NOTHING",
        )
        .bind(image_id)
        .bind(voter_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Ok(VoteOutcome::AlreadyVoted);
        }

        let query = format!(
            "UPDATE images SET votes = votes + 1 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let image = sqlx::query_as::<_, Image>(&query)
            .bind(image_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(VoteOutcome::Recorded(image))
    }

    /// The voter record of an image: ids of every user who voted on it,
    /// in vote order.
    pub async fn voters(pool: &PgPool, image_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT voter_id FROM image_votes WHERE image_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(image_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
