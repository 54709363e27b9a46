pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_users;
mod m20240301_000002_create_voucher_histories;
mod m20240301_000003_create_message_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users::Migration),
            Box::new(m20240301_000002_create_voucher_histories::Migration),
            Box::new(m20240301_000003_create_message_tokens::Migration),
        ]
    }
}
