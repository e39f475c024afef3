//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::attendance::AttendanceRepository;
use crate::domain::duty::DutyRepository;
use crate::domain::group::GroupRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::user::UserRepository;

use super::attendance_repository::SeaOrmAttendanceRepository;
use super::duty_repository::SeaOrmDutyRepository;
use super::group_repository::SeaOrmGroupRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let duties = repos.duties().list(Some(&group_id)).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    groups: SeaOrmGroupRepository,
    duties: SeaOrmDutyRepository,
    attendance: SeaOrmAttendanceRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            groups: SeaOrmGroupRepository::new(db.clone()),
            duties: SeaOrmDutyRepository::new(db.clone()),
            attendance: SeaOrmAttendanceRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn groups(&self) -> &dyn GroupRepository {
        &self.groups
    }

    fn duties(&self) -> &dyn DutyRepository {
        &self.duties
    }

    fn attendance(&self) -> &dyn AttendanceRepository {
        &self.attendance
    }
}
