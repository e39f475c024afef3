//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use super::{contains, db_err, is_unique_violation};
use crate::domain::user::{User, UserFilter, UserRepository, UserRole};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Professor => UserRole::Professor,
        user::UserRole::User => UserRole::User,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Professor => user::UserRole::Professor,
        UserRole::User => user::UserRole::User,
    }
}

fn model_to_domain(m: user::Model) -> User {
    User {
        id: m.id,
        school_id: m.school_id,
        username: m.username,
        email: m.email,
        password_hash: m.password_hash,
        name: m.name,
        section: m.section,
        course: m.course,
        year: m.year,
        department: m.department,
        role: entity_role_to_domain(m.role),
        profile_image: m.profile_image,
        qr_payload: m.qr_payload,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn domain_to_active(u: User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id),
        school_id: Set(u.school_id),
        username: Set(u.username),
        email: Set(u.email),
        password_hash: Set(u.password_hash),
        name: Set(u.name),
        section: Set(u.section),
        course: Set(u.course),
        year: Set(u.year),
        department: Set(u.department),
        role: Set(domain_role_to_entity(u.role)),
        profile_image: Set(u.profile_image),
        qr_payload: Set(u.qr_payload),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}

fn identity_conflict(e: sea_orm::DbErr) -> DomainError {
    if is_unique_violation(&e) {
        DomainError::Conflict("School ID, username or email already exists".to_string())
    } else {
        db_err(e)
    }
}

// ── UserRepository impl ─────────────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn insert(&self, u: User) -> DomainResult<User> {
        debug!(school_id = %u.school_id, "Inserting user");
        let model = domain_to_active(u)
            .insert(&self.db)
            .await
            .map_err(identity_conflict)?;
        Ok(model_to_domain(model))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_school_id(&self, school_id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::SchoolId.eq(school_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_school_ids(&self, school_ids: &[String]) -> DomainResult<Vec<User>> {
        if school_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::SchoolId.is_in(school_ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_by_ids(&self, ids: &[String]) -> DomainResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn list(&self, filter: UserFilter) -> DomainResult<Vec<User>> {
        let mut query = user::Entity::find();

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let lowered = |col: user::Column| {
                Expr::expr(Func::lower(Expr::col((user::Entity, col)))).like(contains(search))
            };
            query = query.filter(
                Condition::any()
                    .add(lowered(user::Column::Username))
                    .add(lowered(user::Column::Name))
                    .add(lowered(user::Column::SchoolId))
                    .add(lowered(user::Column::Email)),
            );
        }

        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(domain_role_to_entity(role)));
        }

        let models = query
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, u: User) -> DomainResult<User> {
        let existing = user::Entity::find_by_id(u.id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: u.id,
            });
        }

        let model = domain_to_active(u)
            .update(&self.db)
            .await
            .map_err(identity_conflict)?;
        Ok(model_to_domain(model))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        }
        Ok(())
    }

    async fn count(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }
}
