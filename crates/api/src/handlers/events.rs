//! Handlers for the `/events` resource: admin-managed event CRUD plus
//! the user-facing registration, leaderboard, and image listing routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use snapvote_core::error::CoreError;
use snapvote_core::leaderboard::VoteOrder;
use snapvote_core::types::DbId;
use snapvote_db::models::event::{CreateEvent, Event, UpdateEvent};
use snapvote_db::models::image::Image;
use snapvote_db::models::registration::Registration;
use snapvote_db::repositories::{EventRepo, ImageRepo, RegistrationRepo, UserRepo};
use validator::Validate;

use crate::error::{is_unique_violation, validate_input, AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::payment::OrderIntent;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /events` and `PUT /events/{id}` (full replace).
#[derive(Debug, Deserialize, Validate)]
pub struct EventPayload {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub description: String,
    /// Price in minor currency units.
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: i64,
    #[validate(length(min = 1, max = 2048, message = "must be 1-2048 characters"))]
    pub image_url: String,
}

/// Request body for `POST /events/{id}/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_id: DbId,
}

/// Response for a successful registration: the persisted registration
/// plus the payment-intent outcome (null when the collaborator failed).
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub registration: Registration,
    pub order: Option<OrderIntent>,
}

/// Query parameters for `GET /events/{id}/leaderboard`.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    /// Sort direction; ascending when omitted.
    #[serde(default)]
    pub order: VoteOrder,
}

// ---------------------------------------------------------------------------
// Admin CRUD
// ---------------------------------------------------------------------------

/// POST /events
///
/// Create an event. Admin only; validation runs before any write.
pub async fn create_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<EventPayload>,
) -> AppResult<(StatusCode, Json<Event>)> {
    validate_input(&input)?;

    let create_dto = CreateEvent {
        name: input.name,
        description: input.description,
        price: input.price,
        image_url: input.image_url,
    };
    let event = EventRepo::create(&state.pool, &create_dto).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /events/{id}
///
/// Replace every field of an event. Admin only.
pub async fn update_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<EventPayload>,
) -> AppResult<Json<Event>> {
    validate_input(&input)?;

    let update_dto = UpdateEvent {
        name: input.name,
        description: input.description,
        price: input.price,
        image_url: input.image_url,
    };
    let event = EventRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    Ok(Json(event))
}

/// DELETE /events/{id}
///
/// Delete an event. Admin only. Returns 204 No Content.
pub async fn delete_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = EventRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Event", id }))
    }
}

/// GET /events
///
/// Public listing of all events.
pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let events = EventRepo::list(&state.pool).await?;
    Ok(Json(events))
}

/// GET /events/{id}
///
/// Public event lookup.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Event>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    Ok(Json(event))
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// POST /events/{id}/register
///
/// Register a user for an event. Uniqueness rides the
/// `uq_registrations_user_event` constraint, so a duplicate -- including
/// one racing this request -- is a conflict and never a second row. The
/// payment intent is requested after the registration is persisted and
/// its failure does not undo the registration; the status stays
/// `PENDING` for out-of-band reconciliation.
pub async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: event_id,
        }))?;

    let registration = RegistrationRepo::create(&state.pool, user.id, event.id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_registrations_user_event") {
                AppError::Core(CoreError::Conflict(
                    "User is already registered for this event".into(),
                ))
            } else {
                AppError::Database(e)
            }
        })?;

    let order = match state.payment.create_order(event.price, user.id, event.id).await {
        Ok(order) => Some(order),
        Err(e) => {
            tracing::warn!(
                error = %e,
                user_id = user.id,
                event_id = event.id,
                "Payment intent creation failed; registration stays PENDING"
            );
            None
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            registration,
            order,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Leaderboard & images
// ---------------------------------------------------------------------------

/// GET /events/{id}/leaderboard
///
/// Public ranking of an event's images by vote count. Ascending unless
/// `?order=desc`; ties break by upload time, oldest first.
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Query(params): Query<LeaderboardParams>,
) -> AppResult<Json<Vec<Image>>> {
    let images = ImageRepo::leaderboard(&state.pool, event_id, params.order).await?;
    Ok(Json(images))
}

/// GET /events/{id}/images
///
/// Public listing of every image uploaded for an event, oldest first.
pub async fn event_images(
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<Json<Vec<Image>>> {
    let images = ImageRepo::list_for_event(&state.pool, event_id).await?;
    Ok(Json(images))
}
