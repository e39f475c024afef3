//! HTTP REST API
//!
//! - `middleware`: bearer-token authentication and the admin gate
//! - `modules`: one module per resource (DTOs + handlers)
//! - `router`: route table, middleware stack and OpenAPI document

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, ApiServices};
