//! Domain-level building blocks shared by the db and api crates:
//! error taxonomy, id/timestamp aliases, role constants, and the
//! registration/voting domain rules (payment statuses, image quota,
//! leaderboard ordering).

pub mod error;
pub mod leaderboard;
pub mod registration;
pub mod roles;
pub mod types;
