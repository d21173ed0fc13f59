use std::sync::Arc;

use crate::config::ServerConfig;
use crate::payment::PaymentGateway;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is either already `Clone` or behind `Arc`.
/// The payment gateway is a trait object so tests can inject a double.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: snapvote_db::DbPool,
    /// Server configuration (read by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// External payment collaborator.
    pub payment: Arc<dyn PaymentGateway>,
}
