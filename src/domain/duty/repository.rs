//! Duty repository interface

use async_trait::async_trait;

use super::model::Duty;
use crate::domain::calendar::DayRange;
use crate::domain::DomainResult;

#[async_trait]
pub trait DutyRepository: Send + Sync {
    /// Fails with `DuplicateDutyForDay` when the group already has a duty
    /// on that day.
    async fn insert(&self, duty: Duty) -> DomainResult<Duty>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Duty>>;

    async fn find_for_group_on(&self, group_id: &str, day: DayRange) -> DomainResult<Option<Duty>>;

    /// All duties whose date falls within `day`.
    async fn find_on(&self, day: DayRange) -> DomainResult<Vec<Duty>>;

    /// Ascending by date; restricted to one group when given.
    async fn list(&self, group_id: Option<&str>) -> DomainResult<Vec<Duty>>;

    async fn update(&self, duty: Duty) -> DomainResult<Duty>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}
