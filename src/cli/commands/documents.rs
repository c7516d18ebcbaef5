//! Document browsing commands.

use console::style;

use crate::config::Settings;
use crate::models::Document;
use crate::repository::{DocumentQuery, DocumentStore};

use super::helpers::{require_database, truncate};
use super::open_store;

/// Characters of content shown in listings.
const PREVIEW_CHARS: usize = 200;

fn print_table(docs: &[Document]) {
    println!("{}", "-".repeat(90));
    println!(
        "{:<36} {:<30} {:<4} {:<16}",
        "ID", "Title", "Lang", "Created"
    );
    println!("{}", "-".repeat(90));
    for doc in docs {
        println!(
            "{:<36} {:<30} {:<4} {:<16}",
            doc.id,
            truncate(&doc.title, 29),
            doc.language.code(),
            doc.created_at.format("%Y-%m-%d %H:%M")
        );
        let preview = doc.content_preview(PREVIEW_CHARS).replace('\n', " ");
        println!("  {}", style(truncate(&preview, 86)).dim());
    }
}

/// Show a single document.
pub async fn cmd_show(settings: &Settings, id: &str) -> anyhow::Result<()> {
    if !require_database(settings) {
        return Ok(());
    }
    let store = open_store(settings)?;

    let Some(doc) = store.get(id).await? else {
        println!("{} Document not found: {}", style("✗").red(), id);
        return Ok(());
    };

    println!("\n{}", style(&doc.title).bold());
    println!("{}", "-".repeat(60));
    println!("{:<10} {}", "ID:", doc.id);
    println!("{:<10} {}", "Language:", doc.language);
    println!(
        "{:<10} {}",
        "Created:",
        doc.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(ref source) = doc.source_file {
        println!("{:<10} {}", "File:", source.display());
    }
    if !doc.tags.is_empty() {
        println!("{:<10} {}", "Tags:", doc.tags.join(", "));
    }

    if !doc.summary.is_empty() {
        println!("\n{}", style("Summary").bold());
        println!("{}", doc.summary);
    }

    println!("\n{}", style("Content").bold());
    println!("{}", doc.content);

    Ok(())
}

/// List documents, newest first.
pub async fn cmd_list(settings: &Settings, skip: usize, limit: usize) -> anyhow::Result<()> {
    if !require_database(settings) {
        return Ok(());
    }
    let store = open_store(settings)?;

    let total = store.count().await?;
    let docs = store.list(skip, limit).await?;

    if docs.is_empty() {
        println!("{} No documents found", style("!").yellow());
        return Ok(());
    }

    println!(
        "\n{} ({}-{} of {})",
        style("Documents").bold(),
        skip + 1,
        skip + docs.len(),
        total
    );
    print_table(&docs);
    Ok(())
}

/// Search documents by text and tags.
pub async fn cmd_search(
    settings: &Settings,
    query: Option<String>,
    tags: Vec<String>,
) -> anyhow::Result<()> {
    if !require_database(settings) {
        return Ok(());
    }
    let store = open_store(settings)?;

    let query = DocumentQuery { text: query, tags };
    let docs = store.search(&query).await?;

    if docs.is_empty() {
        println!("{} No matching documents", style("!").yellow());
        return Ok(());
    }

    println!(
        "\n{} {} matching documents",
        style("✓").green(),
        docs.len()
    );
    print_table(&docs);
    Ok(())
}

/// List tags with document counts.
pub async fn cmd_tags(settings: &Settings) -> anyhow::Result<()> {
    if !require_database(settings) {
        return Ok(());
    }
    let store = open_store(settings)?;
    let tags = store.all_tags().await?;

    if tags.is_empty() {
        println!("{} No tags yet", style("!").yellow());
        return Ok(());
    }

    println!("\n{}", style("Tags").bold());
    println!("{}", "-".repeat(40));
    for (tag, count) in tags {
        println!("{:<32} {:>6}", truncate(&tag, 31), count);
    }
    Ok(())
}
