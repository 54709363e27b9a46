use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use tracing::{debug, info};

/// Creates the parent directory of a file-backed SQLite database.
fn ensure_sqlite_parent(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        debug!("Creating directory {}", parent.display());
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Connects to `database_url` and applies every pending migration.
pub async fn migrate(database_url: &str) -> Result<DatabaseConnection> {
    ensure_sqlite_parent(database_url)?;

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .context("Failed to read migration status")?;
    if pending.is_empty() {
        info!("Database schema is up to date");
        return Ok(db);
    }

    info!("Applying {} migration(s)", pending.len());
    for migration in &pending {
        debug!("Pending: {}", migration.name());
    }
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;
    Ok(db)
}

pub async fn init_database(database_url: &str) -> Result<()> {
    info!("Initializing database {}", database_url);
    migrate(database_url).await?;
    info!("Database initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_in_memory_database() {
        let db = migrate("sqlite::memory:").await.unwrap();
        let pending = Migrator::get_pending_migrations(&db).await.unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn test_non_file_urls_are_left_alone() {
        ensure_sqlite_parent("postgresql://user@localhost/db").unwrap();
        ensure_sqlite_parent("sqlite::memory:").unwrap();
    }

    #[test]
    fn test_sqlite_parent_directory_is_created() {
        let dir = std::env::temp_dir().join(format!("lapis-initdb-{}", std::process::id()));
        let url = format!("sqlite://{}/nested/lapis.db?mode=rwc", dir.display());
        ensure_sqlite_parent(&url).unwrap();
        assert!(dir.join("nested").is_dir());
        std::fs::remove_dir_all(dir).ok();
    }
}
