pub mod create_superuser;
pub mod expire_vouchers;
pub mod initdb;
pub mod migrate_and_serve;
pub mod print_settings;
pub mod serve;

pub use create_superuser::create_superuser;
pub use expire_vouchers::expire_vouchers;
pub use initdb::init_database;
pub use migrate_and_serve::migrate_and_serve;
pub use print_settings::print_settings;
pub use serve::serve;
