//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_slots;
mod m20250101_000002_create_reservations;
mod m20250101_000003_create_payment_methods;
mod m20250101_000004_create_system_logs;
mod m20250101_000005_create_user_profiles;
mod m20250101_000006_create_settlements;
mod m20250101_000007_create_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_slots::Migration),
            Box::new(m20250101_000002_create_reservations::Migration),
            Box::new(m20250101_000003_create_payment_methods::Migration),
            Box::new(m20250101_000004_create_system_logs::Migration),
            Box::new(m20250101_000005_create_user_profiles::Migration),
            Box::new(m20250101_000006_create_settlements::Migration),
            Box::new(m20250101_000007_create_settings::Migration),
        ]
    }
}
