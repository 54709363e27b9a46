use accounts::users::{NewUser, create_superuser as create};
use anyhow::{Context, Result};
use sea_orm::Database;
use tracing::{debug, info};

pub async fn create_superuser(
    database_url: &str,
    email: &str,
    password: &str,
    username: Option<String>,
) -> Result<()> {
    debug!("Database URL: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    let new_user = NewUser {
        username,
        ..NewUser::new(email, Some(password))
    };
    let user = create(&db, new_user)
        .await
        .context("Failed to create superuser")?;

    info!("Superuser {} created with ID {}", user.email, user.id);
    println!("Superuser created: {} (id {})", user.email, user.id);
    Ok(())
}
