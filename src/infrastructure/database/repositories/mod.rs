//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod attendance_repository;
pub mod duty_repository;
pub mod group_repository;
pub mod repository_provider;
pub mod user_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use sea_orm::sea_query::LikeExpr;
use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

pub(crate) fn db_err(e: DbErr) -> DomainError {
    DomainError::Storage(e.to_string())
}

/// Unique index or primary key collision.
pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    e.to_string().contains("UNIQUE constraint failed")
}

/// `%term%` for a case-insensitive LIKE against a lowered column.
/// `\`, `%` and `_` in the term match literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Substring match for [`like_pattern`], with `\` as the escape character.
pub(crate) fn contains(term: &str) -> LikeExpr {
    LikeExpr::new(like_pattern(term)).escape('\\')
}
