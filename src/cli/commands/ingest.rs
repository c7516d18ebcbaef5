//! Ingestion commands.

use std::path::{Path, PathBuf};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use crate::config::{Config, Settings};
use crate::models::Language;
use crate::services::{self, IngestEvent, IngestOptions, IngestOutcome};

use super::build_service;
use super::helpers::{print_degradations, truncate};

/// Expand directory arguments into the supported files inside them.
fn collect_paths(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = services::list_supported_files(path)?;
            if found.is_empty() {
                println!(
                    "{} No supported files in {}",
                    style("!").yellow(),
                    path.display()
                );
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn print_stored(outcome: &IngestOutcome) {
    let doc = &outcome.document;
    println!(
        "{} Stored {} ({})",
        style("✓").green(),
        style(&doc.title).bold(),
        doc.id
    );
    println!("  Language: {}", doc.language);
    if !doc.tags.is_empty() {
        println!("  Tags: {}", doc.tags.join(", "));
    }
    if !doc.summary.is_empty() {
        println!("  Summary: {}", truncate(&doc.summary, 200));
    }
    print_degradations(&outcome.degradations);
}

/// Ingest files and directories.
pub async fn cmd_ingest(
    settings: &Settings,
    config: &Config,
    paths: &[PathBuf],
    title: Option<String>,
    language: Option<Language>,
) -> anyhow::Result<()> {
    settings.ensure_directories()?;
    let service = build_service(settings, config)?;
    let files = collect_paths(paths)?;
    let options = IngestOptions { title, language };

    // A single file reports its full outcome
    if let [path] = files.as_slice() {
        let options = IngestOptions {
            title: options.title.or_else(|| services::file_stem(path)),
            language: options.language,
        };
        let outcome = service.ingest_file(path, &options).await?;
        print_stored(&outcome);
        return Ok(());
    }

    if files.is_empty() {
        return Ok(());
    }

    let (event_tx, mut event_rx) = mpsc::channel::<IngestEvent>(100);

    // Spawn event handler for UI
    let event_handler = tokio::spawn(async move {
        let mut progress: Option<ProgressBar> = None;
        while let Some(event) = event_rx.recv().await {
            match event {
                IngestEvent::Started { total_files } => {
                    let pb = ProgressBar::new(total_files as u64);
                    if let Ok(bar_style) = ProgressStyle::default_bar()
                        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                    {
                        pb.set_style(bar_style.progress_chars("█▓░"));
                    }
                    pb.set_message("Ingesting...");
                    progress = Some(pb);
                }
                IngestEvent::FileStarted { path } => {
                    if let Some(ref pb) = progress {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        pb.set_message(truncate(&name, 40));
                    }
                }
                IngestEvent::FileStored {
                    title,
                    degradations,
                    ..
                } => {
                    if let Some(ref pb) = progress {
                        if !degradations.is_empty() {
                            pb.println(format!(
                                "{} {}: {}",
                                style("!").yellow(),
                                title,
                                degradations
                                    .iter()
                                    .map(|d| d.to_string())
                                    .collect::<Vec<_>>()
                                    .join("; ")
                            ));
                        }
                        pb.inc(1);
                    }
                }
                IngestEvent::FileFailed { path, error } => {
                    if let Some(ref pb) = progress {
                        pb.println(format!(
                            "{} {}: {}",
                            style("✗").red(),
                            path.display(),
                            error
                        ));
                        pb.inc(1);
                    }
                }
                IngestEvent::Complete { .. } => {
                    if let Some(ref pb) = progress {
                        pb.finish_and_clear();
                    }
                }
            }
        }
    });

    let summary = service.ingest_paths(&files, &options, event_tx).await;
    let _ = event_handler.await;

    println!(
        "{} Ingested {} of {} files",
        style("✓").green(),
        summary.succeeded,
        files.len()
    );
    if summary.degraded > 0 {
        println!(
            "  {} {} stored without a full AI annotation",
            style("!").yellow(),
            summary.degraded
        );
    }
    if summary.failed > 0 {
        println!("  {} {} failed", style("✗").red(), summary.failed);
    }

    Ok(())
}

/// Create a document from raw text in a file or on stdin.
pub async fn cmd_create(
    settings: &Settings,
    config: &Config,
    title: &str,
    file: Option<&Path>,
    language: Option<Language>,
) -> anyhow::Result<()> {
    let content = match file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    settings.ensure_directories()?;
    let service = build_service(settings, config)?;
    let options = IngestOptions {
        title: Some(title.to_string()),
        language,
    };

    let outcome = service.ingest_text(&content, &options).await?;
    print_stored(&outcome);
    Ok(())
}
