//! Status command.

use console::style;

use crate::config::{Config, Settings};
use crate::llm::LlmClient;
use crate::repository::DocumentStore;

use super::open_store;

/// Report AI provider availability and database state.
pub async fn cmd_status(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    println!("\n{}", style("dochub status").bold());
    println!("{}", "-".repeat(60));

    let db_path = settings.database_path();
    if settings.database_exists() {
        let store = open_store(settings)?;
        let count = store.count().await?;
        println!(
            "{} Database: {} ({} documents)",
            style("✓").green(),
            db_path.display(),
            count
        );
    } else {
        println!(
            "{} Database: {} (not initialized, run 'dochub init')",
            style("!").yellow(),
            db_path.display()
        );
    }

    if let Some(ref source) = config.source_path {
        println!("  Config: {}", source.display());
    }

    let llm = &config.llm;
    let client = LlmClient::new(llm.clone())?;
    if client.is_available().await {
        println!(
            "{} AI: {} at {} (model: {})",
            style("✓").green(),
            llm.provider.as_str(),
            llm.endpoint,
            llm.model
        );
    } else {
        println!("{} AI: {}", style("✗").red(), llm.availability_hint());
        println!("  Documents are still stored, without summaries or tags");
    }

    Ok(())
}
