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
                    .table(Review::Table)
                    .if_not_exists()
                    .col(uuid(Review::Id).primary_key())
                    .col(uuid(Review::ReviewerId).not_null())
                    .col(string_len_null(Review::ActivityId, 64))
                    .col(integer(Review::Rating).not_null())
                    .col(text(Review::Comment).not_null())
                    .col(
                        timestamp_with_time_zone(Review::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_reviewer")
                            .from(Review::Table, Review::ReviewerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_activity")
                            .from(Review::Table, Review::ActivityId)
                            .to(Activity::Table, Activity::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tip::Table)
                    .if_not_exists()
                    .col(uuid(Tip::Id).primary_key())
                    .col(uuid(Tip::AuthorId).not_null())
                    .col(string_len(Tip::Title, 100).not_null())
                    .col(string_len(Tip::Category, 50).not_null())
                    .col(text(Tip::Content).not_null())
                    .col(
                        timestamp_with_time_zone(Tip::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tip_author")
                            .from(Tip::Table, Tip::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Photo::Table)
                    .if_not_exists()
                    .col(uuid(Photo::Id).primary_key())
                    .col(uuid(Photo::AuthorId).not_null())
                    .col(string_len(Photo::Title, 100).not_null())
                    .col(text_null(Photo::Description))
                    .col(text(Photo::ImageUrl).not_null())
                    .col(
                        timestamp_with_time_zone(Photo::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photo_author")
                            .from(Photo::Table, Photo::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photo::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tip::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Review {
    Table,
    Id,
    ReviewerId,
    ActivityId,
    Rating,
    Comment,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Tip {
    Table,
    Id,
    AuthorId,
    Title,
    Category,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Photo {
    Table,
    Id,
    AuthorId,
    Title,
    Description,
    ImageUrl,
    CreatedAt,
}
