//! Attendance aggregate

pub mod model;
pub mod repository;

pub use model::Attendance;
pub use repository::AttendanceRepository;
