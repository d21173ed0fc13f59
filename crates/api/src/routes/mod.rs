pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod images;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (mounted at the root).
///
/// Route hierarchy:
///
/// ```text
/// /health                      liveness (public)
///
/// /auth/signup                 user signup (public)
/// /auth/login                  user login (public)
/// /auth/admin/login            admin login (public)
///
/// /admin                       create admin (admin only)
///
/// /events                      list (public), create (admin only)
/// /events/{id}                 get (public), update, delete (admin only)
/// /events/{id}/register        register a user (POST)
/// /events/{id}/leaderboard     ranked images (public, ?order=asc|desc)
/// /events/{id}/images          images for the event (public)
///
/// /images                      upload under a registration (POST)
/// /images/{id}                 get one image with voter record (public)
/// /images/{id}/vote            vote on an image (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/events", events::router())
        .nest("/images", images::router())
}
