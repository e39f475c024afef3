//! Duty DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::duties::ScheduledDuty;
use crate::application::notifications::DeliveryReport;
use crate::domain::Duty;
use crate::interfaces::http::modules::groups::MemberDto;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DutyDto {
    pub id: String,
    pub group_id: String,
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    pub place: String,
    /// Free text such as `08:00 AM - 10:00 AM`
    pub time_range: String,
    pub clinical_instructor: String,
    pub area: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Duty> for DutyDto {
    fn from(d: Duty) -> Self {
        Self {
            date: d.day().format("%Y-%m-%d").to_string(),
            id: d.id,
            group_id: d.group_id,
            place: d.place,
            time_range: d.time_range,
            clinical_instructor: d.clinical_instructor,
            area: d.area,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryDto {
    pub sent: usize,
    pub failed: usize,
}

impl From<DeliveryReport> for DeliveryDto {
    fn from(r: DeliveryReport) -> Self {
        Self {
            sent: r.sent,
            failed: r.failed,
        }
    }
}

/// A saved duty and the members it was announced to
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduledDutyDto {
    pub duty: DutyDto,
    pub members: Vec<MemberDto>,
    pub delivery: DeliveryDto,
}

impl From<ScheduledDuty> for ScheduledDutyDto {
    fn from(s: ScheduledDuty) -> Self {
        Self {
            duty: s.duty.into(),
            members: s.members.into_iter().map(MemberDto::from).collect(),
            delivery: s.delivery.into(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDutyRequest {
    #[validate(length(min = 1, message = "group is required"))]
    pub group_id: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp; the time of day is dropped
    #[validate(length(min = 1, message = "date is required"))]
    pub date: String,
    #[validate(length(min = 1, max = 200, message = "place is required"))]
    pub place: String,
    #[serde(alias = "time")]
    #[validate(length(min = 1, max = 100, message = "time is required"))]
    pub time_range: String,
    #[validate(length(min = 1, max = 200, message = "clinical instructor is required"))]
    pub clinical_instructor: String,
    #[validate(length(min = 1, max = 200, message = "area is required"))]
    pub area: String,
}

/// Merge patch: absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDutyRequest {
    pub group_id: Option<String>,
    pub date: Option<String>,
    #[validate(length(max = 200))]
    pub place: Option<String>,
    #[serde(alias = "time")]
    #[validate(length(max = 100))]
    pub time_range: Option<String>,
    #[validate(length(max = 200))]
    pub clinical_instructor: Option<String>,
    #[validate(length(max = 200))]
    pub area: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListDutiesParams {
    /// Only duties of this group
    pub group_id: Option<String>,
}
