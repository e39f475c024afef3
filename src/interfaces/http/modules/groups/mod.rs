//! Groups module: cohorts and their single-group membership

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
