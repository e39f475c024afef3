//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::attendance::AttendanceRepository;
use super::duty::DutyRepository;
use super::group::GroupRepository;
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let user = repos.users().find_by_school_id("2021-0001").await?;
///     let group = repos.groups().find_by_member(&user.id).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn groups(&self) -> &dyn GroupRepository;
    fn duties(&self) -> &dyn DutyRepository;
    fn attendance(&self) -> &dyn AttendanceRepository;
}
