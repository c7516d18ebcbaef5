//! Summary and tag generation for extracted text.
//!
//! Both AI calls are independent. A failed call never aborts annotation: it
//! leaves an empty summary or tag list and a [`Degradation`] in the report.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::{PromptSet, TextGenerator};
use crate::models::{Annotation, Language};

use super::language;

/// Marker appended to truncated content and summaries.
const ELLIPSIS: &str = "...";

/// Numeric limits applied while annotating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationLimits {
    /// Content longer than this many characters is truncated in prompts.
    pub max_content_chars: usize,
    /// Summaries with more words are cut to this many.
    pub max_summary_words: usize,
    /// At most this many tags are kept.
    pub max_tags: usize,
    pub summary_max_tokens: u32,
    pub tags_max_tokens: u32,
}

impl Default for AnnotationLimits {
    fn default() -> Self {
        Self {
            max_content_chars: 8000,
            max_summary_words: 500,
            max_tags: 10,
            summary_max_tokens: 1000,
            tags_max_tokens: 200,
        }
    }
}

/// Outcome of a single AI call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    Generated(String),
    /// The call failed; carries the reason.
    Degraded(String),
}

/// Which annotation step degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationStep {
    Summary,
    Tags,
}

impl std::fmt::Display for AnnotationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Tags => write!(f, "tags"),
        }
    }
}

/// A step that fell back to an empty value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    pub step: AnnotationStep,
    pub reason: String,
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} unavailable: {}", self.step, self.reason)
    }
}

/// Annotation plus any steps that degraded.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationReport {
    pub annotation: Annotation,
    pub degradations: Vec<Degradation>,
}

impl AnnotationReport {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Produces summaries and tags through a [`TextGenerator`].
#[derive(Clone)]
pub struct Annotator {
    generator: Arc<dyn TextGenerator>,
    limits: AnnotationLimits,
}

impl Annotator {
    pub fn new(generator: Arc<dyn TextGenerator>, limits: AnnotationLimits) -> Self {
        Self { generator, limits }
    }

    /// Annotate `content`, classifying its language unless one is given.
    pub async fn annotate(&self, content: &str, language: Option<Language>) -> AnnotationReport {
        let language = language.unwrap_or_else(|| language::classify(content));
        let prompts = PromptSet::for_language(language);
        debug!(language = language.code(), "Annotating content");

        let mut degradations = Vec::new();

        let summary = match self.generate_summary(prompts, content).await {
            Generation::Generated(summary) => summary,
            Generation::Degraded(reason) => {
                warn!("Summary generation failed: {}", reason);
                degradations.push(Degradation {
                    step: AnnotationStep::Summary,
                    reason,
                });
                String::new()
            }
        };

        let tags = match self.generate_tags(prompts, content).await {
            Generation::Generated(response) => parse_tags(&response, self.limits.max_tags),
            Generation::Degraded(reason) => {
                warn!("Tag generation failed: {}", reason);
                degradations.push(Degradation {
                    step: AnnotationStep::Tags,
                    reason,
                });
                Vec::new()
            }
        };

        AnnotationReport {
            annotation: Annotation {
                summary,
                tags,
                language,
            },
            degradations,
        }
    }

    async fn generate_summary(&self, prompts: &PromptSet, content: &str) -> Generation {
        let truncated = truncate_content(content, self.limits.max_content_chars);
        let prompt = prompts.summary_prompt(&truncated);
        match self
            .generator
            .generate(&prompt, self.limits.summary_max_tokens)
            .await
        {
            Ok(response) => Generation::Generated(limit_words(
                response.trim(),
                self.limits.max_summary_words,
            )),
            Err(e) => Generation::Degraded(e.to_string()),
        }
    }

    async fn generate_tags(&self, prompts: &PromptSet, content: &str) -> Generation {
        let truncated = truncate_content(content, self.limits.max_content_chars);
        let prompt = prompts.tags_prompt(&truncated);
        match self
            .generator
            .generate(&prompt, self.limits.tags_max_tokens)
            .await
        {
            Ok(response) => Generation::Generated(response),
            Err(e) => Generation::Degraded(e.to_string()),
        }
    }
}

/// First `max_chars` characters plus an ellipsis, or the content unchanged.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{}", &content[..end], ELLIPSIS),
        None => content.to_string(),
    }
}

/// First `max_words` whitespace-separated words plus an ellipsis, or the text unchanged.
pub fn limit_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        format!("{}{}", words[..max_words].join(" "), ELLIPSIS)
    } else {
        text.to_string()
    }
}

/// Split a comma-separated response into at most `max_tags` non-empty tags.
pub fn parse_tags(response: &str, max_tags: usize) -> Vec<String> {
    response
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(max_tags)
        .map(str::to_string)
        .collect()
}
