//! Role names embedded in JWT claims.
//!
//! Admins authenticate against the `admins` table and carry [`ROLE_ADMIN`];
//! ordinary users authenticate against the `users` table and carry
//! [`ROLE_USER`]. The role claim alone is not sufficient for admin routes:
//! the api layer re-checks that the admin row still exists.

/// Role claim for administrators.
pub const ROLE_ADMIN: &str = "admin";

/// Role claim for ordinary users.
pub const ROLE_USER: &str = "user";
