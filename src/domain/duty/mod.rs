//! Duty aggregate

pub mod model;
pub mod repository;

pub use model::{Duty, DutyPatch, NewDuty};
pub use repository::DutyRepository;
