//! Route definitions for the `/images` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// POST /            -> add_image
/// GET  /{id}        -> get_image
/// POST /{id}/vote   -> vote
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(images::add_image))
        .route("/{id}", get(images::get_image))
        .route("/{id}/vote", post(images::vote))
}
