//! User aggregate
//!
//! Contains the User entity and repository interface.

pub mod model;
pub mod repository;

pub use model::{attendance_qr_payload, default_avatar_url, User, UserRole};
pub use repository::{UserFilter, UserRepository};
