//! Duties module: per-group, per-day assignments

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
