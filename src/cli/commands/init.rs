//! Initialize command.

use console::style;

use crate::config::Settings;
use crate::repository::SqliteDocumentStore;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let db_path = settings.database_path();
    SqliteDocumentStore::open(&db_path)?;

    println!(
        "{} Initialized dochub in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    println!("  Database: {}", db_path.display());

    Ok(())
}
