//! Route definitions for the `/admin` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST / -> create_admin (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(admin::create_admin))
}
