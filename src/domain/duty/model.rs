//! Duty domain entity

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// One group's clinical assignment on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct Duty {
    pub id: String,
    pub group_id: String,
    /// Local midnight of the duty day
    pub date: NaiveDateTime,
    pub place: String,
    /// Free-form shift label, e.g. "7:00 AM - 3:00 PM"
    pub time_range: String,
    pub clinical_instructor: String,
    pub area: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Duty {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Fields of a duty to create.
#[derive(Debug, Clone)]
pub struct NewDuty {
    pub group_id: String,
    pub date: NaiveDateTime,
    pub place: String,
    pub time_range: String,
    pub clinical_instructor: String,
    pub area: String,
}

/// Partial duty update; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct DutyPatch {
    pub group_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub place: Option<String>,
    pub time_range: Option<String>,
    pub clinical_instructor: Option<String>,
    pub area: Option<String>,
}

impl DutyPatch {
    pub fn is_empty(&self) -> bool {
        self.group_id.is_none()
            && self.date.is_none()
            && self.place.is_none()
            && self.time_range.is_none()
            && self.clinical_instructor.is_none()
            && self.area.is_none()
    }

    /// Overlay the present fields on `duty`.
    pub fn apply_to(self, duty: &mut Duty) {
        if let Some(group_id) = self.group_id {
            duty.group_id = group_id;
        }
        if let Some(date) = self.date {
            duty.date = date;
        }
        if let Some(place) = self.place {
            duty.place = place;
        }
        if let Some(time_range) = self.time_range {
            duty.time_range = time_range;
        }
        if let Some(instructor) = self.clinical_instructor {
            duty.clinical_instructor = instructor;
        }
        if let Some(area) = self.area {
            duty.area = area;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duty() -> Duty {
        Duty {
            id: "d1".into(),
            group_id: "g1".into(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            place: "Ward 3".into(),
            time_range: "7:00 AM - 3:00 PM".into(),
            clinical_instructor: "Dr. Cruz".into(),
            area: "Pediatrics".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut d = duty();
        DutyPatch {
            place: Some("Ward 5".into()),
            ..Default::default()
        }
        .apply_to(&mut d);

        assert_eq!(d.place, "Ward 5");
        assert_eq!(d.area, "Pediatrics");
        assert_eq!(d.group_id, "g1");
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(DutyPatch::default().is_empty());
        assert!(!DutyPatch {
            area: Some("ER".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
