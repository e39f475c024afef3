//! Create duties table
//!
//! `(group_id, date)` is unique: one duty per group per calendar day.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Duties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Duties::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Duties::GroupId).string().not_null())
                    .col(ColumnDef::new(Duties::Date).date_time().not_null())
                    .col(ColumnDef::new(Duties::Place).string().not_null())
                    .col(ColumnDef::new(Duties::TimeRange).string().not_null())
                    .col(ColumnDef::new(Duties::ClinicalInstructor).string().not_null())
                    .col(ColumnDef::new(Duties::Area).string().not_null())
                    .col(
                        ColumnDef::new(Duties::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Duties::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_duties_group_date")
                    .table(Duties::Table)
                    .col(Duties::GroupId)
                    .col(Duties::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_duties_date")
                    .table(Duties::Table)
                    .col(Duties::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Duties::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Duties {
    Table,
    Id,
    GroupId,
    Date,
    Place,
    TimeRange,
    ClinicalInstructor,
    Area,
    CreatedAt,
    UpdatedAt,
}
