//! Group repository interface

use async_trait::async_trait;

use super::model::Group;
use crate::domain::DomainResult;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Group>>;

    /// Exact name match.
    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Group>>;

    /// Newest first; `search` is a case-insensitive substring of the name.
    async fn list(&self, search: Option<&str>) -> DomainResult<Vec<Group>>;

    /// The group currently holding `user_id`, if any.
    async fn find_by_member(&self, user_id: &str) -> DomainResult<Option<Group>>;

    /// Create a group and its memberships atomically.
    ///
    /// A taken name yields `DuplicateName`; a member already grouped
    /// elsewhere yields `AlreadyGrouped` and nothing is written.
    async fn create_with_members(&self, name: &str, member_ids: &[String]) -> DomainResult<Group>;

    /// Fails with `AlreadyGrouped` when the user already has a group.
    async fn add_member(&self, group_id: &str, user_id: &str) -> DomainResult<()>;

    /// Returns `false` when the user was not a member of that group.
    async fn remove_member(&self, group_id: &str, user_id: &str) -> DomainResult<bool>;

    async fn rename(&self, id: &str, name: &str) -> DomainResult<Group>;

    /// Delete the group and its memberships. Duties are left in place.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
