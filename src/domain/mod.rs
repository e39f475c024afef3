//! Domain layer: entities, repository traits and calendar rules.

pub mod attendance;
pub mod calendar;
pub mod duty;
pub mod group;
pub mod repositories;
pub mod user;

pub use attendance::{Attendance, AttendanceRepository};
pub use calendar::{Clock, DayRange, FixedClock, SystemClock};
pub use duty::{Duty, DutyPatch, DutyRepository, NewDuty};
pub use group::{Group, GroupRepository};
pub use repositories::{DomainResult, RepositoryProvider};
pub use user::{User, UserFilter, UserRepository, UserRole};

pub use crate::shared::errors::DomainError;
