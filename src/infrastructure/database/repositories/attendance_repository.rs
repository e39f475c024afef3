//! SeaORM implementation of AttendanceRepository

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{db_err, is_unique_violation};
use crate::domain::attendance::{Attendance, AttendanceRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::attendance;

pub struct SeaOrmAttendanceRepository {
    db: DatabaseConnection,
}

impl SeaOrmAttendanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: attendance::Model) -> Attendance {
    Attendance {
        id: m.id,
        user_id: m.user_id,
        school_id: m.school_id,
        date: m.date,
        time_in: m.time_in,
        created_at: m.created_at,
    }
}

#[async_trait]
impl AttendanceRepository for SeaOrmAttendanceRepository {
    async fn insert(&self, a: Attendance) -> DomainResult<Attendance> {
        let school_id = a.school_id.clone();
        let day = a.date.date().to_string();

        let model = attendance::ActiveModel {
            id: Set(a.id),
            user_id: Set(a.user_id),
            school_id: Set(a.school_id),
            date: Set(a.date),
            time_in: Set(a.time_in),
            created_at: Set(a.created_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::AlreadyMarkedToday {
                    school_id,
                    date: day,
                }
            } else {
                db_err(e)
            }
        })?;

        Ok(model_to_domain(model))
    }

    async fn find_for_day(
        &self,
        school_id: &str,
        date: NaiveDateTime,
    ) -> DomainResult<Option<Attendance>> {
        let model = attendance::Entity::find()
            .filter(attendance::Column::SchoolId.eq(school_id))
            .filter(attendance::Column::Date.eq(date))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn list_for_school_id(&self, school_id: &str) -> DomainResult<Vec<Attendance>> {
        let models = attendance::Entity::find()
            .filter(attendance::Column::SchoolId.eq(school_id))
            .order_by_desc(attendance::Column::Date)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list_all(&self) -> DomainResult<Vec<Attendance>> {
        let models = attendance::Entity::find()
            .order_by_desc(attendance::Column::Date)
            .order_by_desc(attendance::Column::TimeIn)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}
