//! Create attendance table
//!
//! `(school_id, date)` is unique: one check-in per student per day.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Attendance::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Attendance::UserId).string().not_null())
                    .col(ColumnDef::new(Attendance::SchoolId).string().not_null())
                    .col(ColumnDef::new(Attendance::Date).date_time().not_null())
                    .col(ColumnDef::new(Attendance::TimeIn).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Attendance::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_school_date")
                    .table(Attendance::Table)
                    .col(Attendance::SchoolId)
                    .col(Attendance::Date)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attendance::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Attendance {
    Table,
    Id,
    UserId,
    SchoolId,
    Date,
    TimeIn,
    CreatedAt,
}
