//! # MCare
//!
//! Student duty scheduling and QR attendance for a college.
//!
//! ## Architecture
//!
//! - **domain**: entities, repository traits, calendar-day rules and the clock
//! - **application**: group membership, duty scheduling, attendance,
//!   reminders, identity and notification fan-out
//! - **infrastructure**: SeaORM persistence, SMTP mail, JWT and bcrypt
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: process lifecycle

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use infrastructure::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};

pub use interfaces::http::{create_api_router, ApiServices};
