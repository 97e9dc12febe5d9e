use sea_orm_migration::{prelude::*, schema::*};

use super::m20250301_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Badge::Table)
                    .if_not_exists()
                    .col(uuid(Badge::Id).primary_key())
                    .col(string_len(Badge::Name, 100).not_null().unique_key())
                    .col(text(Badge::Description).not_null())
                    .col(string_len(Badge::Icon, 16).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserBadge::Table)
                    .if_not_exists()
                    .col(uuid(UserBadge::Id).primary_key())
                    .col(uuid(UserBadge::UserId).not_null())
                    .col(uuid(UserBadge::BadgeId).not_null())
                    .col(
                        timestamp_with_time_zone(UserBadge::EarnedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_badge_user")
                            .from(UserBadge::Table, UserBadge::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_badge_badge")
                            .from(UserBadge::Table, UserBadge::BadgeId)
                            .to(Badge::Table, Badge::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (user, badge): grants lean on this for idempotency.
        manager
            .create_index(
                Index::create()
                    .name("idx_user_badge_unique")
                    .table(UserBadge::Table)
                    .col(UserBadge::UserId)
                    .col(UserBadge::BadgeId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserBadge::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Badge::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Badge {
    Table,
    Id,
    Name,
    Description,
    Icon,
}

#[derive(DeriveIden)]
pub enum UserBadge {
    Table,
    Id,
    UserId,
    BadgeId,
    EarnedAt,
}
