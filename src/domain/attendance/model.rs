//! Attendance domain entity

use chrono::{DateTime, NaiveDateTime, Utc};

/// Proof a student was present on a calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct Attendance {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    /// Local midnight of the attendance day
    pub date: NaiveDateTime,
    /// Local wall-clock check-in time, `HH:MM:SS`
    pub time_in: String,
    pub created_at: DateTime<Utc>,
}
