use accounts::VoucherLedger;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sea_orm::Database;
use tracing::{debug, info};

/// Expires vouchers whose window ended before `today`; meant to run daily.
pub async fn expire_vouchers(database_url: &str, today: Option<NaiveDate>) -> Result<()> {
    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .context("Failed to connect to database")?;
    let expired = VoucherLedger::new(&db)
        .expire_due(today)
        .await
        .context("Failed to expire vouchers")?;

    info!("Expired {} vouchers as of {}", expired, today);
    println!("Expired {} vouchers as of {}", expired, today);
    Ok(())
}
