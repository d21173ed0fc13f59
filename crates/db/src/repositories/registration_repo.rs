//! Repository for the `registrations` table.
//!
//! Registration uniqueness rides on `uq_registrations_user_event`; the
//! upload quota is enforced with a conditional increment inside a
//! transaction so concurrent uploads can never exceed the ceiling.

use snapvote_core::registration::{MAX_IMAGES_PER_REGISTRATION, PAYMENT_EXPIRED, PAYMENT_PENDING};
use snapvote_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::image::Image;
use crate::models::registration::{AddImageOutcome, Registration};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, event_id, payment_status, image_count, created_at";

/// Provides registration creation, lookup, and the quota-guarded image
/// upload.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Insert a registration with `payment_status = 'PENDING'` and
    /// `image_count = 0`.
    ///
    /// A second registration for the same (user, event) pair -- including
    /// one racing this call -- fails on `uq_registrations_user_event`;
    /// the caller maps that violation to a conflict.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<Registration, sqlx::Error> {
        let query = format!(
            "INSERT INTO registrations (user_id, event_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    /// Find the registration linking a user to an event, if any.
    pub async fn find_by_user_and_event(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM registrations WHERE user_id = $1 AND event_id = $2");
        sqlx::query_as::<_, Registration>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    /// Atomically create an image under the caller's registration for an
    /// event, respecting the upload quota.
    ///
    /// The conditional increment is the guard: it only matches a
    /// registration row that still has quota, so two racing calls for the
    /// last slot serialize on the row and exactly one wins. The image
    /// insert happens in the same transaction -- the counter never drifts
    /// from the number of image rows.
    pub async fn add_image(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
        image_url: &str,
    ) -> Result<AddImageOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let incremented: Option<(DbId,)> = sqlx::query_as(
            "UPDATE registrations SET image_count = image_count + 1
             WHERE user_id = $1 AND event_id = $2 AND image_count < $3
             RETURNING id",
        )
        .bind(user_id)
        .bind(event_id)
        .bind(MAX_IMAGES_PER_REGISTRATION)
        .fetch_optional(&mut *tx)
        .await?;

        if incremented.is_none() {
            // Nothing matched: either no registration exists, or the
            // quota is spent. Distinguish inside the same transaction.
            let exists: Option<(DbId,)> = sqlx::query_as(
                "SELECT id FROM registrations WHERE user_id = $1 AND event_id = $2",
            )
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(&mut *tx)
            .await?;

            return Ok(match exists {
                Some(_) => AddImageOutcome::QuotaExceeded,
                None => AddImageOutcome::NotRegistered,
            });
        }

        let image = sqlx::query_as::<_, Image>(
            "INSERT INTO images (user_id, event_id, image_url)
             VALUES ($1, $2, $3)
             RETURNING id, user_id, event_id, image_url, votes, created_at",
        )
        .bind(user_id)
        .bind(event_id)
        .bind(image_url)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(AddImageOutcome::Created(image))
    }

    /// Mark `PENDING` registrations created before `cutoff` as `EXPIRED`.
    ///
    /// Returns the number of rows updated. Used by the payment
    /// reconciliation job.
    pub async fn expire_stale_pending(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE registrations SET payment_status = $2
             WHERE payment_status = $3 AND created_at < $1",
        )
        .bind(cutoff)
        .bind(PAYMENT_EXPIRED)
        .bind(PAYMENT_PENDING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
