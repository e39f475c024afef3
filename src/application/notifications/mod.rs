//! Outgoing notifications: templates and fan-out.

pub mod notifier;
pub mod templates;

pub use notifier::{DeliveryMode, DeliveryReport, Notifier};
pub use templates::DutyNotice;
