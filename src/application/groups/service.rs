//! Group membership management
//!
//! A user belongs to at most one group. The membership table carries a
//! primary key on the user, so the store rejects a second membership even
//! when two requests race past the checks below.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::group::normalize_group_name;
use crate::domain::{DomainError, DomainResult, Group, RepositoryProvider, User};

/// A group together with its resolved member records.
#[derive(Debug, Clone)]
pub struct GroupDetails {
    pub group: Group,
    pub members: Vec<User>,
}

/// Result of adding one school ID to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberOutcome {
    Added { school_id: String, name: String },
    /// Already a member of `group` (possibly the target group itself)
    Skipped { school_id: String, group: String },
    NotFound { school_id: String },
}

/// Per-item outcomes of a batch add, bucketed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddMembersReport {
    pub added: Vec<MemberOutcome>,
    pub skipped: Vec<MemberOutcome>,
    pub not_found: Vec<MemberOutcome>,
}

impl AddMembersReport {
    pub fn push(&mut self, outcome: MemberOutcome) {
        match outcome {
            MemberOutcome::Added { .. } => self.added.push(outcome),
            MemberOutcome::Skipped { .. } => self.skipped.push(outcome),
            MemberOutcome::NotFound { .. } => self.not_found.push(outcome),
        }
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.skipped.len() + self.not_found.len()
    }
}

impl FromIterator<MemberOutcome> for AddMembersReport {
    fn from_iter<I: IntoIterator<Item = MemberOutcome>>(iter: I) -> Self {
        let mut report = Self::default();
        for outcome in iter {
            report.push(outcome);
        }
        report
    }
}

pub struct GroupMembershipManager {
    repos: Arc<dyn RepositoryProvider>,
}

impl GroupMembershipManager {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    // ── Commands ────────────────────────────────────────────────

    /// Create a group with an initial member list given as school IDs.
    ///
    /// All-or-nothing: an unknown or already grouped candidate rejects the
    /// whole request and nothing is written.
    pub async fn create_group(&self, name: &str, school_ids: &[String]) -> DomainResult<GroupDetails> {
        let name = normalize_group_name(name)
            .ok_or_else(|| DomainError::Validation("Group name is required".into()))?;

        if self.repos.groups().find_by_name(&name).await?.is_some() {
            return Err(DomainError::DuplicateName(name));
        }

        let wanted = distinct_school_ids(school_ids);
        let found = self.repos.users().find_by_school_ids(&wanted).await?;

        let mut members = Vec::with_capacity(wanted.len());
        for school_id in &wanted {
            let user = found
                .iter()
                .find(|u| &u.school_id == school_id)
                .ok_or_else(|| DomainError::UnknownMember(school_id.clone()))?;
            members.push(user.clone());
        }

        for user in &members {
            if let Some(current) = self.repos.groups().find_by_member(&user.id).await? {
                return Err(DomainError::AlreadyGrouped {
                    school_id: user.school_id.clone(),
                    group: current.name,
                });
            }
        }

        let member_ids: Vec<String> = members.iter().map(|u| u.id.clone()).collect();
        let group = self
            .repos
            .groups()
            .create_with_members(&name, &member_ids)
            .await?;

        info!(group_id = %group.id, name = %group.name, members = members.len(), "👥 Group created");
        Ok(GroupDetails { group, members })
    }

    /// Add school IDs to an existing group, one at a time.
    ///
    /// Per-item problems land in the report instead of failing the batch.
    /// Only a missing target group or a storage failure aborts.
    pub async fn add_members(&self, group_id: &str, school_ids: &[String]) -> DomainResult<AddMembersReport> {
        let group = self
            .repos
            .groups()
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| DomainError::UnknownGroup(group_id.to_string()))?;

        let mut report = AddMembersReport::default();
        for school_id in distinct_school_ids(school_ids) {
            let outcome = self.add_one(&group, school_id).await?;
            debug!(group_id = %group.id, ?outcome, "Member outcome");
            report.push(outcome);
        }

        info!(
            group_id = %group.id,
            added = report.added.len(),
            skipped = report.skipped.len(),
            not_found = report.not_found.len(),
            "👥 Members added to group"
        );
        Ok(report)
    }

    async fn add_one(&self, group: &Group, school_id: String) -> DomainResult<MemberOutcome> {
        let Some(user) = self.repos.users().find_by_school_id(&school_id).await? else {
            return Ok(MemberOutcome::NotFound { school_id });
        };

        if let Some(current) = self.repos.groups().find_by_member(&user.id).await? {
            return Ok(MemberOutcome::Skipped {
                school_id,
                group: current.name,
            });
        }

        match self.repos.groups().add_member(&group.id, &user.id).await {
            Ok(()) => Ok(MemberOutcome::Added {
                school_id,
                name: user.display_name().to_string(),
            }),
            // lost a race against another request
            Err(DomainError::AlreadyGrouped { group: holder, .. }) => Ok(MemberOutcome::Skipped {
                school_id,
                group: holder,
            }),
            Err(e) => Err(e),
        }
    }

    /// Remove a user (by record ID) from a group.
    pub async fn remove_member(&self, group_id: &str, user_id: &str) -> DomainResult<()> {
        let group = self
            .repos
            .groups()
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| DomainError::UnknownGroup(group_id.to_string()))?;

        let not_a_member = || DomainError::NotAMember {
            group_id: group.id.clone(),
            user_id: user_id.to_string(),
        };

        if !group.has_member(user_id) {
            return Err(not_a_member());
        }
        if !self.repos.groups().remove_member(&group.id, user_id).await? {
            return Err(not_a_member());
        }

        info!(group_id = %group.id, user_id, "👥 Member removed from group");
        Ok(())
    }

    pub async fn rename_group(&self, group_id: &str, name: &str) -> DomainResult<GroupDetails> {
        let name = normalize_group_name(name)
            .ok_or_else(|| DomainError::Validation("Group name is required".into()))?;

        if let Some(existing) = self.repos.groups().find_by_name(&name).await? {
            if existing.id != group_id {
                return Err(DomainError::DuplicateName(name));
            }
        }

        let group = self.repos.groups().rename(group_id, &name).await?;
        self.with_members(group).await
    }

    /// Delete a group and its memberships. Duties of the group are kept.
    pub async fn delete_group(&self, group_id: &str) -> DomainResult<()> {
        self.repos.groups().delete(group_id).await?;
        info!(group_id, "👥 Group deleted");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list_groups(&self, search: Option<&str>) -> DomainResult<Vec<GroupDetails>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let groups = self.repos.groups().list(search).await?;

        let mut details = Vec::with_capacity(groups.len());
        for group in groups {
            details.push(self.with_members(group).await?);
        }
        Ok(details)
    }

    pub async fn get_group(&self, group_id: &str) -> DomainResult<GroupDetails> {
        let group = self
            .repos
            .groups()
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Group",
                field: "id",
                value: group_id.to_string(),
            })?;
        self.with_members(group).await
    }

    /// The group a user currently belongs to, if any.
    pub async fn group_of(&self, user_id: &str) -> DomainResult<Option<Group>> {
        self.repos.groups().find_by_member(user_id).await
    }

    async fn with_members(&self, group: Group) -> DomainResult<GroupDetails> {
        let members = self.repos.users().find_by_ids(&group.member_ids).await?;
        Ok(GroupDetails { group, members })
    }
}

/// Trimmed, non-empty, first occurrence wins.
fn distinct_school_ids(school_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    school_ids
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_string()))
        .map(str::to_string)
        .collect()
}
