pub mod service;

pub use service::{DutyScheduler, ScheduledDuty};
