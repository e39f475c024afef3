pub mod service;

pub use service::{AttendanceEntry, AttendanceRecorder, MarkedAttendance};
