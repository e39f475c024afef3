//! Duty scheduling
//!
//! At most one duty per group per calendar day. Creation checks the day
//! range first for a clean error; the unique `(group_id, date)` index is
//! the backstop for races and for updates. Members are notified from a
//! snapshot of the group taken at the time of the action.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::notifications::{DeliveryReport, Notifier};
use crate::domain::calendar::{normalize, DayRange};
use crate::domain::{DomainError, DomainResult, Duty, DutyPatch, NewDuty, RepositoryProvider, User};

/// A persisted duty plus the members it was announced to.
#[derive(Debug, Clone)]
pub struct ScheduledDuty {
    pub duty: Duty,
    pub members: Vec<User>,
    pub delivery: DeliveryReport,
}

pub struct DutyScheduler {
    repos: Arc<dyn RepositoryProvider>,
    notifier: Arc<Notifier>,
}

impl DutyScheduler {
    pub fn new(repos: Arc<dyn RepositoryProvider>, notifier: Arc<Notifier>) -> Self {
        Self { repos, notifier }
    }

    pub async fn create_duty(&self, new: NewDuty) -> DomainResult<ScheduledDuty> {
        let new = validated(new)?;

        let group = self
            .repos
            .groups()
            .find_by_id(&new.group_id)
            .await?
            .ok_or_else(|| DomainError::UnknownGroup(new.group_id.clone()))?;

        let date = normalize(new.date);
        let day = DayRange::of(date.date());
        if self
            .repos
            .duties()
            .find_for_group_on(&group.id, day)
            .await?
            .is_some()
        {
            return Err(DomainError::DuplicateDutyForDay {
                group_id: group.id,
                date: date.date().to_string(),
            });
        }

        let now = Utc::now();
        let duty = self
            .repos
            .duties()
            .insert(Duty {
                id: Uuid::new_v4().to_string(),
                group_id: group.id.clone(),
                date,
                place: new.place,
                time_range: new.time_range,
                clinical_instructor: new.clinical_instructor,
                area: new.area,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(duty_id = %duty.id, group = %group.name, date = %duty.day(), "📅 Duty created");

        let members = self.repos.users().find_by_ids(&group.member_ids).await?;
        let delivery = self
            .notifier
            .duty_assigned(&duty, &group.name, &members)
            .await;

        Ok(ScheduledDuty {
            duty,
            members,
            delivery,
        })
    }

    /// Merge `patch` into an existing duty.
    ///
    /// The per-day rule is not re-checked here; a same-day collision is
    /// reported by the store as `DuplicateDutyForDay`.
    pub async fn update_duty(&self, id: &str, patch: DutyPatch) -> DomainResult<ScheduledDuty> {
        let mut duty = self.get_duty(id).await?;

        let patch = DutyPatch {
            date: patch.date.map(normalize),
            place: trimmed(patch.place, "place")?,
            time_range: trimmed(patch.time_range, "time")?,
            clinical_instructor: trimmed(patch.clinical_instructor, "clinical instructor")?,
            area: trimmed(patch.area, "area")?,
            group_id: patch.group_id,
        };

        if let Some(group_id) = &patch.group_id {
            if self.repos.groups().find_by_id(group_id).await?.is_none() {
                return Err(DomainError::UnknownGroup(group_id.clone()));
            }
        }

        patch.apply_to(&mut duty);
        duty.updated_at = Utc::now();
        let duty = self.repos.duties().update(duty).await?;

        info!(duty_id = %duty.id, date = %duty.day(), "📅 Duty updated");

        let (members, delivery) = match self.repos.groups().find_by_id(&duty.group_id).await? {
            Some(group) => {
                let members = self.repos.users().find_by_ids(&group.member_ids).await?;
                let delivery = self
                    .notifier
                    .duty_updated(&duty, &group.name, &members)
                    .await;
                (members, delivery)
            }
            None => {
                warn!(duty_id = %duty.id, group_id = %duty.group_id, "Duty group no longer exists, nobody notified");
                (Vec::new(), DeliveryReport::default())
            }
        };

        Ok(ScheduledDuty {
            duty,
            members,
            delivery,
        })
    }

    pub async fn delete_duty(&self, id: &str) -> DomainResult<()> {
        let duty = self.get_duty(id).await?;
        self.repos.duties().delete(&duty.id).await?;
        info!(duty_id = %duty.id, "📅 Duty deleted");
        Ok(())
    }

    /// Duties ordered by date ascending, optionally for one group.
    pub async fn list_duties(&self, group_id: Option<&str>) -> DomainResult<Vec<Duty>> {
        self.repos.duties().list(group_id).await
    }

    pub async fn get_duty(&self, id: &str) -> DomainResult<Duty> {
        self.repos
            .duties()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Duty",
                field: "id",
                value: id.to_string(),
            })
    }

    /// Duties of the user's current group; empty when ungrouped.
    pub async fn duties_for_user(&self, user_id: &str) -> DomainResult<Vec<Duty>> {
        if self.repos.users().find_by_id(user_id).await?.is_none() {
            return Err(DomainError::UnknownUser(user_id.to_string()));
        }
        match self.repos.groups().find_by_member(user_id).await? {
            Some(group) => self.repos.duties().list(Some(&group.id)).await,
            None => Ok(Vec::new()),
        }
    }
}

fn validated(new: NewDuty) -> DomainResult<NewDuty> {
    let required = |value: String, field: &str| -> DomainResult<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::Validation(format!("{} is required", field)));
        }
        Ok(value.to_string())
    };

    Ok(NewDuty {
        group_id: required(new.group_id, "group")?,
        date: new.date,
        place: required(new.place, "place")?,
        time_range: required(new.time_range, "time")?,
        clinical_instructor: required(new.clinical_instructor, "clinical instructor")?,
        area: required(new.area, "area")?,
    })
}

fn trimmed(value: Option<String>, field: &str) -> DomainResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Err(DomainError::Validation(format!("{} must not be empty", field))),
        Some(v) => Ok(Some(v.to_string())),
    }
}
