//! Attendance repository interface

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::model::Attendance;
use crate::domain::DomainResult;

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Fails with `AlreadyMarkedToday` when `(school_id, date)` exists.
    async fn insert(&self, attendance: Attendance) -> DomainResult<Attendance>;

    /// `date` must be a normalized day.
    async fn find_for_day(
        &self,
        school_id: &str,
        date: NaiveDateTime,
    ) -> DomainResult<Option<Attendance>>;

    /// Newest day first.
    async fn list_for_school_id(&self, school_id: &str) -> DomainResult<Vec<Attendance>>;

    /// Newest day first.
    async fn list_all(&self) -> DomainResult<Vec<Attendance>>;
}
