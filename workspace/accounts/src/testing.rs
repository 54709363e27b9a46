use migration::{Migrator, MigratorTrait};
use model::entities::custom_user;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use crate::users::{NewUser, create_user};

/// In-memory database with all migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to sqlite");

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None).await.expect("Migrations failed.");
    db
}

pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> custom_user::Model {
    create_user(db, NewUser::new(email, Some("password123")))
        .await
        .expect("Failed to create test user")
}
