use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No FK to user: anonymous guests are re-identified by fingerprint,
        // not linked to accounts.
        manager
            .create_table(
                Table::create()
                    .table(AnonymousGuest::Table)
                    .if_not_exists()
                    .col(uuid(AnonymousGuest::Id).primary_key())
                    .col(
                        string_len(AnonymousGuest::Fingerprint, 128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(string_len_null(AnonymousGuest::DisplayName, 100))
                    .col(string_len_null(AnonymousGuest::Phone, 32))
                    .col(string_len_null(AnonymousGuest::Email, 255))
                    .col(
                        timestamp_with_time_zone(AnonymousGuest::LastSeen)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(AnonymousGuest::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnonymousGuest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AnonymousGuest {
    Table,
    Id,
    Fingerprint,
    DisplayName,
    Phone,
    Email,
    LastSeen,
    CreatedAt,
}
