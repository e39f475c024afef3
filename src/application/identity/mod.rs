//! Identity module: user management and authentication
//!
//! Contains the `UserService` which orchestrates all user-related
//! use-cases: login, registration, profile updates, password changes
//! and user administration.

pub mod service;

pub use service::{
    validate_password_strength, AdminUserUpdate, AuthResult, ProfileUpdate, Registration,
    UserService, UserWithGroup,
};
