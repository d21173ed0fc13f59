//! Handlers for the `/images` resource: quota-bounded uploads, lookup,
//! and voting.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use snapvote_core::error::CoreError;
use snapvote_core::registration::MAX_IMAGES_PER_REGISTRATION;
use snapvote_core::types::DbId;
use snapvote_db::models::image::{Image, VoteOutcome};
use snapvote_db::models::registration::AddImageOutcome;
use snapvote_db::repositories::{ImageRepo, RegistrationRepo, UserRepo};
use validator::Validate;

use crate::error::{validate_input, AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /images`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddImageRequest {
    pub user_id: DbId,
    pub event_id: DbId,
    #[validate(length(min = 1, max = 2048, message = "must be 1-2048 characters"))]
    pub image_url: String,
}

/// Request body for `POST /images/{id}/vote`.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub user_id: DbId,
}

/// Single-image response: the row plus its voter record.
#[derive(Debug, Serialize)]
pub struct ImageDetail {
    #[serde(flatten)]
    pub image: Image,
    /// Ids of every user who voted on this image, in vote order.
    pub voters: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /images
///
/// Upload an image under the caller's registration for an event. The
/// quota check, counter increment, and image insert are one atomic
/// repository operation, so concurrent uploads can never exceed the
/// per-registration maximum.
pub async fn add_image(
    State(state): State<AppState>,
    Json(input): Json<AddImageRequest>,
) -> AppResult<(StatusCode, Json<Image>)> {
    validate_input(&input)?;

    let outcome =
        RegistrationRepo::add_image(&state.pool, input.user_id, input.event_id, &input.image_url)
            .await?;

    match outcome {
        AddImageOutcome::Created(image) => Ok((StatusCode::CREATED, Json(image))),
        AddImageOutcome::NotRegistered => Err(AppError::Core(CoreError::NotFound {
            entity: "Registration for user",
            id: input.user_id,
        })),
        AddImageOutcome::QuotaExceeded => Err(AppError::Core(CoreError::QuotaExceeded(format!(
            "At most {MAX_IMAGES_PER_REGISTRATION} images may be uploaded per registration"
        )))),
    }
}

/// GET /images/{id}
///
/// Public image lookup, including the voter record.
pub async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ImageDetail>> {
    let image = ImageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Image", id }))?;
    let voters = ImageRepo::voters(&state.pool, id).await?;
    Ok(Json(ImageDetail { image, voters }))
}

/// POST /images/{id}/vote
///
/// Record a vote by a user on an image. The voter-record insert and the
/// counter increment are one atomic repository operation keyed on the
/// unique (image, voter) constraint: a duplicate vote -- even a
/// concurrent one -- is a conflict and never a double count.
pub async fn vote(
    State(state): State<AppState>,
    Path(image_id): Path<DbId>,
    Json(input): Json<VoteRequest>,
) -> AppResult<Json<Image>> {
    let voter = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    match ImageRepo::vote(&state.pool, image_id, voter.id).await? {
        VoteOutcome::Recorded(image) => Ok(Json(image)),
        VoteOutcome::AlreadyVoted => Err(AppError::Core(CoreError::Conflict(
            "User has already voted for this image".into(),
        ))),
        VoteOutcome::ImageNotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Image",
            id: image_id,
        })),
    }
}
