//! Group DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::groups::{AddMembersReport, GroupDetails, MemberOutcome};
use crate::domain::User;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberDto {
    pub id: String,
    pub school_id: String,
    pub name: String,
    pub email: String,
    pub section: Option<String>,
}

impl From<User> for MemberDto {
    fn from(u: User) -> Self {
        Self {
            name: u.display_name().to_string(),
            id: u.id,
            school_id: u.school_id,
            email: u.email,
            section: u.section,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupDto {
    pub id: String,
    pub name: String,
    pub members: Vec<MemberDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupDetails> for GroupDto {
    fn from(d: GroupDetails) -> Self {
        Self {
            id: d.group.id,
            name: d.group.name,
            members: d.members.into_iter().map(MemberDto::from).collect(),
            created_at: d.group.created_at,
            updated_at: d.group.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "group name must be 1-100 characters"))]
    pub name: String,
    /// School IDs of the initial members
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameGroupRequest {
    #[validate(length(min = 1, max = 100, message = "group name must be 1-100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddMembersRequest {
    #[validate(length(min = 1, message = "at least one school ID is required"))]
    pub school_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddedMember {
    pub school_id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SkippedMember {
    pub school_id: String,
    /// Group the user already belongs to
    pub group: String,
}

/// Per-item outcome of a batch add
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddMembersResponse {
    pub added: Vec<AddedMember>,
    pub skipped: Vec<SkippedMember>,
    pub not_found: Vec<String>,
}

impl From<AddMembersReport> for AddMembersResponse {
    fn from(report: AddMembersReport) -> Self {
        let mut response = Self {
            added: Vec::new(),
            skipped: Vec::new(),
            not_found: Vec::new(),
        };
        let outcomes = report
            .added
            .into_iter()
            .chain(report.skipped)
            .chain(report.not_found);
        for outcome in outcomes {
            match outcome {
                MemberOutcome::Added { school_id, name } => {
                    response.added.push(AddedMember { school_id, name })
                }
                MemberOutcome::Skipped { school_id, group } => {
                    response.skipped.push(SkippedMember { school_id, group })
                }
                MemberOutcome::NotFound { school_id } => response.not_found.push(school_id),
            }
        }
        response
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListGroupsParams {
    /// Case-insensitive match on the group name
    pub search: Option<String>,
}
