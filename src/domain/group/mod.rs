//! Group aggregate

pub mod model;
pub mod repository;

pub use model::{normalize_group_name, Group};
pub use repository::GroupRepository;
