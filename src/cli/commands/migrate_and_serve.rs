use anyhow::Result;
use tracing::info;

use super::initdb::migrate;
use super::serve::run_server;
use crate::config::{Settings, build_app_state};

/// Applies pending migrations, then serves on the migrated connection.
pub async fn migrate_and_serve(settings: &Settings) -> Result<()> {
    let db = migrate(&settings.database_url).await?;
    info!("Migrations applied, starting server");
    run_server(build_app_state(db, settings.clone()), &settings.bind_address).await
}
