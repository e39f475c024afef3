//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_groups;
mod m20250101_000003_create_group_memberships;
mod m20250101_000004_create_duties;
mod m20250101_000005_create_attendance;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_groups::Migration),
            Box::new(m20250101_000003_create_group_memberships::Migration),
            Box::new(m20250101_000004_create_duties::Migration),
            Box::new(m20250101_000005_create_attendance::Migration),
        ]
    }
}
