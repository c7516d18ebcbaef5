//! Language detection command.

use std::path::Path;

use console::style;

use crate::extract::ContentExtractor;
use crate::services::language;

/// Extract a file and print its detected language. Nothing is stored.
pub async fn cmd_detect(path: &Path) -> anyhow::Result<()> {
    let extracted = ContentExtractor::new().extract_file(path).await?;

    if extracted.is_blank() {
        println!("{} {} contains no text", style("!").yellow(), path.display());
        return Ok(());
    }

    let text = extracted.as_str();
    let detected = language::classify(text);
    println!(
        "{} {}: {}",
        style("✓").green(),
        path.display(),
        style(detected.code()).cyan().bold()
    );
    println!(
        "  {} characters, diacritic ratio {:.3}",
        text.chars().count(),
        language::diacritic_ratio(text)
    );

    Ok(())
}
