//! Periodic reconciliation of pending registrations.
//!
//! Registrations are persisted `PENDING` regardless of the payment-intent
//! outcome; confirmation arrives out-of-band. This task bounds the
//! `PENDING` window: rows older than the configured expiry are flipped to
//! `EXPIRED` on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use snapvote_db::repositories::RegistrationRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the reconciliation sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the reconciliation loop until `cancel` is triggered.
///
/// `pending_expiry_hours` comes from the payment configuration.
pub async fn run(pool: PgPool, pending_expiry_hours: i64, cancel: CancellationToken) {
    tracing::info!(
        pending_expiry_hours,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Payment reconciliation job started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Payment reconciliation job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::hours(pending_expiry_hours);
                match RegistrationRepo::expire_stale_pending(&pool, cutoff).await {
                    Ok(expired) => {
                        if expired > 0 {
                            tracing::info!(expired, "Payment reconciliation: expired stale registrations");
                        } else {
                            tracing::debug!("Payment reconciliation: nothing to expire");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Payment reconciliation: sweep failed");
                    }
                }
            }
        }
    }
}
