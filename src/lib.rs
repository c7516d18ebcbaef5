//! dochub - document ingestion with AI summaries and tags.
//!
//! Documents (plain text, markdown, PDF, Word) are reduced to plain text,
//! classified as English or Vietnamese, summarized and tagged through a
//! pluggable text generator, and stored in SQLite.

pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod repository;
pub mod services;
