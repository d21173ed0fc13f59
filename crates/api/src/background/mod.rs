//! Background maintenance tasks spawned at startup.

pub mod payment_reconciliation;
