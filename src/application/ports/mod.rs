//! Application ports (hexagonal architecture boundaries)
//!
//! Outbound ports implemented by the infrastructure layer live here.

pub mod outbound;

pub use outbound::{Email, NotificationSender, NotifyError};
