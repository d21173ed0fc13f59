//! Registration domain rules: payment statuses and the per-registration
//! image upload quota.
//!
//! Payment status is reconciled out-of-band: every registration starts
//! `PENDING`; a confirmed payment flips it to `PAID`; the background
//! reconciliation job expires stale `PENDING` rows to `EXPIRED`.

/// Payment not yet confirmed (initial state of every registration).
pub const PAYMENT_PENDING: &str = "PENDING";

/// Payment confirmed out-of-band.
pub const PAYMENT_PAID: &str = "PAID";

/// Payment never arrived within the reconciliation window.
pub const PAYMENT_EXPIRED: &str = "EXPIRED";

/// All valid payment status values.
pub const VALID_PAYMENT_STATUSES: &[&str] = &[PAYMENT_PENDING, PAYMENT_PAID, PAYMENT_EXPIRED];

/// Maximum number of images a user may upload per registration.
pub const MAX_IMAGES_PER_REGISTRATION: i32 = 3;

/// Validate that a payment status string is one of the accepted values.
pub fn validate_payment_status(status: &str) -> Result<(), String> {
    if VALID_PAYMENT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(format!(
            "Invalid payment status '{status}'. Must be one of: {}",
            VALID_PAYMENT_STATUSES.join(", ")
        ))
    }
}

/// True when a registration with `image_count` uploads may accept another.
pub fn has_upload_quota(image_count: i32) -> bool {
    image_count < MAX_IMAGES_PER_REGISTRATION
}
