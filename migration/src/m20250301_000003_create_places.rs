use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::User;
use super::m20250301_000002_create_activities::Activity;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Place::Table)
                    .if_not_exists()
                    .col(uuid(Place::Id).primary_key())
                    .col(string_len(Place::ActivityId, 64).not_null())
                    .col(uuid(Place::ProviderId).not_null())
                    .col(string_len(Place::Name, 150).not_null())
                    .col(string_len(Place::Location, 255).not_null())
                    .col(string_len_null(Place::Price, 100))
                    .col(boolean(Place::IsFree).not_null().default(false))
                    .col(string_len_null(Place::OpeningTime, 100))
                    .col(string_len_null(Place::Contact, 100))
                    .col(boolean(Place::IsAvailable).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Place::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_activity")
                            .from(Place::Table, Place::ActivityId)
                            .to(Activity::Table, Activity::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_place_provider")
                            .from(Place::Table, Place::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Place::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Place {
    Table,
    Id,
    ActivityId,
    ProviderId,
    Name,
    Location,
    Price,
    IsFree,
    OpeningTime,
    Contact,
    IsAvailable,
    CreatedAt,
}
