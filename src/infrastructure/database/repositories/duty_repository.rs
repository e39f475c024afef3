//! SeaORM implementation of DutyRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use super::{db_err, is_unique_violation};
use crate::domain::calendar::DayRange;
use crate::domain::duty::{Duty, DutyRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::duty;

pub struct SeaOrmDutyRepository {
    db: DatabaseConnection,
}

impl SeaOrmDutyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: duty::Model) -> Duty {
    Duty {
        id: m.id,
        group_id: m.group_id,
        date: m.date,
        place: m.place,
        time_range: m.time_range,
        clinical_instructor: m.clinical_instructor,
        area: m.area,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(d: Duty) -> duty::ActiveModel {
    duty::ActiveModel {
        id: Set(d.id),
        group_id: Set(d.group_id),
        date: Set(d.date),
        place: Set(d.place),
        time_range: Set(d.time_range),
        clinical_instructor: Set(d.clinical_instructor),
        area: Set(d.area),
        created_at: Set(d.created_at),
        updated_at: Set(d.updated_at),
    }
}

fn write_err(group_id: &str, date: &chrono::NaiveDateTime) -> impl FnOnce(sea_orm::DbErr) -> DomainError {
    let group_id = group_id.to_string();
    let date = date.date().to_string();
    move |e| {
        if is_unique_violation(&e) {
            DomainError::DuplicateDutyForDay { group_id, date }
        } else {
            db_err(e)
        }
    }
}

#[async_trait]
impl DutyRepository for SeaOrmDutyRepository {
    async fn insert(&self, d: Duty) -> DomainResult<Duty> {
        debug!(group_id = %d.group_id, date = %d.date, "Inserting duty");
        let on_err = write_err(&d.group_id, &d.date);
        let model = domain_to_active(d)
            .insert(&self.db)
            .await
            .map_err(on_err)?;
        Ok(model_to_domain(model))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Duty>> {
        let model = duty::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_for_group_on(&self, group_id: &str, day: DayRange) -> DomainResult<Option<Duty>> {
        let model = duty::Entity::find()
            .filter(duty::Column::GroupId.eq(group_id))
            .filter(duty::Column::Date.between(day.start, day.end))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_on(&self, day: DayRange) -> DomainResult<Vec<Duty>> {
        let models = duty::Entity::find()
            .filter(duty::Column::Date.between(day.start, day.end))
            .order_by_asc(duty::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list(&self, group_id: Option<&str>) -> DomainResult<Vec<Duty>> {
        let mut query = duty::Entity::find();
        if let Some(group_id) = group_id {
            query = query.filter(duty::Column::GroupId.eq(group_id));
        }
        let models = query
            .order_by_asc(duty::Column::Date)
            .order_by_asc(duty::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, d: Duty) -> DomainResult<Duty> {
        let existing = duty::Entity::find_by_id(d.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "Duty",
                field: "id",
                value: d.id,
            });
        }

        let on_err = write_err(&d.group_id, &d.date);
        let model = domain_to_active(d)
            .update(&self.db)
            .await
            .map_err(on_err)?;
        Ok(model_to_domain(model))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = duty::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "Duty",
                field: "id",
                value: id.to_string(),
            });
        }
        Ok(())
    }
}
