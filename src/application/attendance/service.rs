//! Attendance recording
//!
//! One record per school ID per local calendar day. The existence check
//! gives a readable error; the unique `(school_id, date)` index settles
//! races.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::calendar::{normalize, wall_clock_time, Clock};
use crate::domain::{Attendance, DomainError, DomainResult, RepositoryProvider, User};

/// A freshly marked attendance and the student it belongs to.
#[derive(Debug, Clone)]
pub struct MarkedAttendance {
    pub attendance: Attendance,
    pub user: User,
}

/// An attendance record with its user, when the user still exists.
#[derive(Debug, Clone)]
pub struct AttendanceEntry {
    pub attendance: Attendance,
    pub user: Option<User>,
}

pub struct AttendanceRecorder {
    repos: Arc<dyn RepositoryProvider>,
    clock: Arc<dyn Clock>,
}

impl AttendanceRecorder {
    pub fn new(repos: Arc<dyn RepositoryProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// Mark the student with `school_id` present today.
    pub async fn mark(&self, school_id: &str) -> DomainResult<MarkedAttendance> {
        let school_id = school_id.trim();
        let user = self
            .repos
            .users()
            .find_by_school_id(school_id)
            .await?
            .ok_or_else(|| DomainError::UnknownUser(school_id.to_string()))?;

        let now = self.clock.now();
        let today = normalize(now);

        if self
            .repos
            .attendance()
            .find_for_day(&user.school_id, today)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyMarkedToday {
                school_id: user.school_id,
                date: today.date().to_string(),
            });
        }

        let attendance = self
            .repos
            .attendance()
            .insert(Attendance {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                school_id: user.school_id.clone(),
                date: today,
                time_in: wall_clock_time(now),
                created_at: Utc::now(),
            })
            .await?;

        metrics::counter!("attendance_marked_total").increment(1);
        info!(
            school_id = %attendance.school_id,
            date = %today.date(),
            time_in = %attendance.time_in,
            "✅ Attendance marked for {}",
            user.display_name()
        );

        Ok(MarkedAttendance { attendance, user })
    }

    /// Attendance of one student, most recent first.
    pub async fn list_for_school_id(&self, school_id: &str) -> DomainResult<Vec<Attendance>> {
        if self.repos.users().find_by_school_id(school_id).await?.is_none() {
            return Err(DomainError::UnknownUser(school_id.to_string()));
        }
        self.repos.attendance().list_for_school_id(school_id).await
    }

    /// Every attendance record, most recent first.
    pub async fn list_all(&self) -> DomainResult<Vec<AttendanceEntry>> {
        let records = self.repos.attendance().list_all().await?;

        let mut user_ids: Vec<String> = records.iter().map(|a| a.user_id.clone()).collect();
        user_ids.sort();
        user_ids.dedup();
        let users = self.repos.users().find_by_ids(&user_ids).await?;

        Ok(records
            .into_iter()
            .map(|attendance| {
                let user = users.iter().find(|u| u.id == attendance.user_id).cloned();
                AttendanceEntry { attendance, user }
            })
            .collect())
    }
}
