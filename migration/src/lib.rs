pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_activities;
mod m20250301_000003_create_places;
mod m20250301_000004_create_bookings;
mod m20250301_000005_create_anonymous_guests;
mod m20250301_000006_create_badges;
mod m20250301_000007_create_notifications;
mod m20250612_000001_add_reset_tokens;
mod m20250815_000001_create_community_content;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_activities::Migration),
            Box::new(m20250301_000003_create_places::Migration),
            Box::new(m20250301_000004_create_bookings::Migration),
            Box::new(m20250301_000005_create_anonymous_guests::Migration),
            Box::new(m20250301_000006_create_badges::Migration),
            Box::new(m20250301_000007_create_notifications::Migration),
            Box::new(m20250612_000001_add_reset_tokens::Migration),
            Box::new(m20250815_000001_create_community_content::Migration),
        ]
    }
}
