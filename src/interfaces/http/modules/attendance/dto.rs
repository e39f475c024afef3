//! Attendance DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::attendance::{AttendanceEntry, MarkedAttendance};
use crate::domain::Attendance;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceDto {
    pub id: String,
    pub user_id: String,
    pub school_id: String,
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    /// Local check-in time, `HH:MM:SS`
    pub time_in: String,
    pub created_at: DateTime<Utc>,
}

impl From<Attendance> for AttendanceDto {
    fn from(a: Attendance) -> Self {
        Self {
            date: a.date.format("%Y-%m-%d").to_string(),
            id: a.id,
            user_id: a.user_id,
            school_id: a.school_id,
            time_in: a.time_in,
            created_at: a.created_at,
        }
    }
}

/// Result of a QR scan
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkAttendanceResponse {
    pub attendance: AttendanceDto,
    /// Student greeting name
    pub name: String,
}

impl From<MarkedAttendance> for MarkAttendanceResponse {
    fn from(m: MarkedAttendance) -> Self {
        Self {
            name: m.user.display_name().to_string(),
            attendance: m.attendance.into(),
        }
    }
}

/// Attendance row of the admin listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntryDto {
    #[serde(flatten)]
    pub attendance: AttendanceDto,
    /// Absent when the user has since been deleted
    pub name: Option<String>,
    pub username: Option<String>,
    pub section: Option<String>,
}

impl From<AttendanceEntry> for AttendanceEntryDto {
    fn from(e: AttendanceEntry) -> Self {
        let (name, username, section) = match e.user {
            Some(u) => (Some(u.display_name().to_string()), Some(u.username), u.section),
            None => (None, None, None),
        };
        Self {
            attendance: e.attendance.into(),
            name,
            username,
            section,
        }
    }
}
