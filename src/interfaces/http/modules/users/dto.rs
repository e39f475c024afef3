//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::identity::UserWithGroup;
use crate::domain::{Group, User};

/// User API representation. The password hash never leaves the service.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub school_id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub section: Option<String>,
    pub course: Option<String>,
    pub year: Option<i32>,
    pub department: Option<String>,
    /// `user`, `professor` or `admin`
    pub role: String,
    pub profile_image: String,
    /// Attendance QR content
    pub qr_payload: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            school_id: u.school_id,
            username: u.username,
            email: u.email,
            name: u.name,
            section: u.section,
            course: u.course,
            year: u.year,
            department: u.department,
            role: u.role.as_str().to_string(),
            profile_image: u.profile_image,
            qr_payload: u.qr_payload,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupRef {
    pub id: String,
    pub name: String,
}

impl From<Group> for GroupRef {
    fn from(g: Group) -> Self {
        Self { id: g.id, name: g.name }
    }
}

/// A user with their current group
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDetailsDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub group: Option<GroupRef>,
}

impl From<UserWithGroup> for UserDetailsDto {
    fn from(u: UserWithGroup) -> Self {
        Self {
            user: u.user.into(),
            group: u.group.map(GroupRef::from),
        }
    }
}

/// Admin edit; blank values are ignored
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserRequest {
    #[validate(length(max = 50, message = "school ID must be at most 50 characters"))]
    pub school_id: Option<String>,
    #[validate(length(max = 50, message = "username must be at most 50 characters"))]
    pub username: Option<String>,
    pub name: Option<String>,
    pub section: Option<String>,
    pub course: Option<String>,
    pub department: Option<String>,
    /// `user`, `professor` or `admin`
    pub role: Option<String>,
}

/// List users query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Case-insensitive match on name, username, e-mail or school ID
    pub search: Option<String>,
    /// Filter by role (user, professor, admin)
    pub role: Option<String>,
}
