//! Route definitions for the `/events` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// POST   /                  -> create_event (admin only)
/// GET    /                  -> list_events
/// GET    /{id}              -> get_event
/// PUT    /{id}              -> update_event (admin only)
/// DELETE /{id}              -> delete_event (admin only)
/// POST   /{id}/register     -> register
/// GET    /{id}/leaderboard  -> leaderboard (?order=asc|desc)
/// GET    /{id}/images       -> event_images
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(events::create_event).get(events::list_events))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/{id}/register", post(events::register))
        .route("/{id}/leaderboard", get(events::leaderboard))
        .route("/{id}/images", get(events::event_images))
}
