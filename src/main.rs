use dotenvy::dotenv;
use pocket_bank::{
    config::{self, database},
    core::bills,
    entities::{Account, Bill, User},
    errors::Result,
};
use sea_orm::{EntityTrait, PaginatorTrait};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load application configuration: {e}"))?;
    info!(
        "Notification policy: {:?}",
        app_config.workflow.notification_policy
    );

    // 4. Connect and make sure the schema exists
    let database_url = app_config.database_url();
    ensure_sqlite_parent_dir(&database_url)?;
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;

    // 5. Seed configured bills
    bills::seed_bills(&db, &app_config.bills)
        .await
        .inspect_err(|e| error!("Failed to seed bills: {e}"))?;

    // 6. Summary
    let users = User::find().count(&db).await?;
    let accounts = Account::find().count(&db).await?;
    let bills = Bill::find().count(&db).await?;
    info!("Ledger ready: {users} user(s), {accounts} account(s), {bills} bill(s).");

    Ok(())
}

/// Creates the directory holding a file-backed `SQLite` database, if needed.
fn ensure_sqlite_parent_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let file = rest.split('?').next().unwrap_or(rest);
    match Path::new(file).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)?,
        _ => {}
    }
    Ok(())
}
