//! SeaORM implementation of GroupRepository
//!
//! Memberships live in `group_memberships`, keyed by user. Multi-row
//! writes (create, delete) run inside one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use super::{contains, db_err, is_unique_violation};
use crate::domain::group::{Group, GroupRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{group, group_membership, user};

pub struct SeaOrmGroupRepository {
    db: DatabaseConnection,
}

impl SeaOrmGroupRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Build the conflict for a user whose membership row already exists.
    async fn already_grouped(&self, user_id: &str) -> DomainResult<DomainError> {
        let school_id = user::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(|u| u.school_id)
            .unwrap_or_else(|| user_id.to_string());
        let group = self
            .find_by_member(user_id)
            .await?
            .map(|g| g.name)
            .unwrap_or_default();
        Ok(DomainError::AlreadyGrouped { school_id, group })
    }

    /// Attach member IDs (join order) to each group model.
    async fn with_members<C: ConnectionTrait>(
        conn: &C,
        models: Vec<group::Model>,
    ) -> DomainResult<Vec<Group>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let memberships = group_membership::Entity::find()
            .filter(group_membership::Column::GroupId.is_in(ids))
            .order_by_asc(group_membership::Column::JoinedAt)
            .all(conn)
            .await
            .map_err(db_err)?;

        let mut by_group: HashMap<String, Vec<String>> = HashMap::new();
        for m in memberships {
            by_group.entry(m.group_id).or_default().push(m.user_id);
        }

        Ok(models
            .into_iter()
            .map(|m| Group {
                member_ids: by_group.remove(&m.id).unwrap_or_default(),
                id: m.id,
                name: m.name,
                created_at: m.created_at,
                updated_at: m.updated_at,
            })
            .collect())
    }

    async fn one_with_members<C: ConnectionTrait>(
        conn: &C,
        model: Option<group::Model>,
    ) -> DomainResult<Option<Group>> {
        match model {
            Some(m) => Ok(Self::with_members(conn, vec![m]).await?.pop()),
            None => Ok(None),
        }
    }
}

fn group_not_found(id: &str) -> DomainError {
    DomainError::NotFound {
        entity: "Group",
        field: "id",
        value: id.to_string(),
    }
}

// ── GroupRepository impl ────────────────────────────────────────

#[async_trait]
impl GroupRepository for SeaOrmGroupRepository {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Group>> {
        let model = group::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Self::one_with_members(&self.db, model).await
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Group>> {
        let model = group::Entity::find()
            .filter(group::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Self::one_with_members(&self.db, model).await
    }

    async fn list(&self, search: Option<&str>) -> DomainResult<Vec<Group>> {
        let mut query = group::Entity::find();

        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((group::Entity, group::Column::Name))))
                    .like(contains(search)),
            );
        }

        let models = query
            .order_by_desc(group::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Self::with_members(&self.db, models).await
    }

    async fn find_by_member(&self, user_id: &str) -> DomainResult<Option<Group>> {
        let membership = group_membership::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        match membership {
            Some(m) => self.find_by_id(&m.group_id).await,
            None => Ok(None),
        }
    }

    async fn create_with_members(&self, name: &str, member_ids: &[String]) -> DomainResult<Group> {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().to_string();

        let txn = self.db.begin().await.map_err(db_err)?;

        let model = group::ActiveModel {
            id: Set(id.clone()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::DuplicateName(name.to_string())
            } else {
                db_err(e)
            }
        })?;

        let mut failed: Option<(String, sea_orm::DbErr)> = None;
        for user_id in member_ids {
            let inserted = group_membership::ActiveModel {
                user_id: Set(user_id.clone()),
                group_id: Set(id.clone()),
                joined_at: Set(now),
            }
            .insert(&txn)
            .await;

            if let Err(e) = inserted {
                failed = Some((user_id.clone(), e));
                break;
            }
        }

        if let Some((user_id, e)) = failed {
            // Release the connection before looking up the holder.
            txn.rollback().await.map_err(db_err)?;
            if is_unique_violation(&e) {
                return Err(self.already_grouped(&user_id).await?);
            }
            return Err(db_err(e));
        }

        let created = Self::one_with_members(&txn, Some(model)).await?;
        txn.commit().await.map_err(db_err)?;

        debug!(group_id = %id, members = member_ids.len(), "Group created");
        created.ok_or_else(|| group_not_found(&id))
    }

    async fn add_member(&self, group_id: &str, user_id: &str) -> DomainResult<()> {
        let inserted = group_membership::ActiveModel {
            user_id: Set(user_id.to_string()),
            group_id: Set(group_id.to_string()),
            joined_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(self.already_grouped(user_id).await?),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn remove_member(&self, group_id: &str, user_id: &str) -> DomainResult<bool> {
        let result = group_membership::Entity::delete_many()
            .filter(group_membership::Column::GroupId.eq(group_id))
            .filter(group_membership::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn rename(&self, id: &str, name: &str) -> DomainResult<Group> {
        let existing = group::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| group_not_found(id))?;

        let mut active: group::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                DomainError::DuplicateName(name.to_string())
            } else {
                db_err(e)
            }
        })?;

        Self::one_with_members(&self.db, Some(model))
            .await?
            .ok_or_else(|| group_not_found(id))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        group_membership::Entity::delete_many()
            .filter(group_membership::Column::GroupId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = group::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(group_not_found(id));
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}
