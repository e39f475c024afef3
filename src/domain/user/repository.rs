//! User repository interface

use async_trait::async_trait;

use super::model::{User, UserRole};
use crate::domain::DomainResult;

/// Filter for administrative user listings
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring of username, name, school ID or e-mail
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Unique-column collisions are reported as `Conflict`.
    async fn insert(&self, user: User) -> DomainResult<User>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    async fn find_by_school_id(&self, school_id: &str) -> DomainResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Resolve many school IDs at once; unknown IDs are simply absent.
    async fn find_by_school_ids(&self, school_ids: &[String]) -> DomainResult<Vec<User>>;

    /// Resolve many user IDs at once; unknown IDs are simply absent.
    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<User>>;

    /// Newest first.
    async fn list(&self, filter: UserFilter) -> DomainResult<Vec<User>>;

    /// Persist all mutable fields of an existing user.
    async fn update(&self, user: User) -> DomainResult<User>;

    async fn delete(&self, id: &str) -> DomainResult<()>;

    async fn count(&self) -> DomainResult<u64>;
}
