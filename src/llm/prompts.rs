//! Prompt templates for summarization and tagging, per language.

use thiserror::Error;

use crate::models::Language;

/// Errors from prompt selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Instructions prefixed (and, for tags, suffixed) to document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSet {
    /// Language the instructions are written in.
    pub language: Language,
    /// Instruction placed before the content in the summarization prompt.
    pub summary: &'static str,
    /// Instruction placed before the content in the tagging prompt.
    pub tags: &'static str,
    /// Output-format request placed after the content in the tagging prompt.
    pub tags_output: &'static str,
}

const ENGLISH: PromptSet = PromptSet {
    language: Language::English,
    summary: "Summarize the following document content in a concise manner, not exceeding 500 words:",
    tags: "Based on the document content, suggest 3-5 relevant tags or labels:",
    tags_output: "Return only the tags as a comma-separated list:",
};

const VIETNAMESE: PromptSet = PromptSet {
    language: Language::Vietnamese,
    summary: "Tóm tắt nội dung tài liệu sau một cách ngắn gọn, không quá 500 từ:",
    tags: "Dựa trên nội dung tài liệu, đề xuất 3-5 thẻ tag phù hợp:",
    tags_output: "Trả về danh sách các tag cách nhau bởi dấu phẩy:",
};

impl PromptSet {
    pub fn for_language(language: Language) -> &'static PromptSet {
        match language {
            Language::English => &ENGLISH,
            Language::Vietnamese => &VIETNAMESE,
        }
    }

    /// Look up prompts by two-letter language tag.
    pub fn for_code(code: &str) -> Result<&'static PromptSet, PromptError> {
        Language::from_code(code)
            .map(Self::for_language)
            .ok_or_else(|| PromptError::UnsupportedLanguage(code.to_string()))
    }

    /// Summarization prompt: instruction, blank line, content.
    pub fn summary_prompt(&self, content: &str) -> String {
        format!("{}\n\n{}", self.summary, content)
    }

    /// Tagging prompt: instruction, blank line, content, blank line, output request.
    pub fn tags_prompt(&self, content: &str) -> String {
        format!("{}\n\n{}\n\n{}", self.tags, content, self.tags_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_prompts() {
        let prompts = PromptSet::for_language(Language::English);
        assert_eq!(
            prompts.summary,
            "Summarize the following document content in a concise manner, not exceeding 500 words:"
        );
        assert_eq!(
            prompts.tags,
            "Based on the document content, suggest 3-5 relevant tags or labels:"
        );
    }

    #[test]
    fn test_vietnamese_prompts() {
        let prompts = PromptSet::for_code("vi").unwrap();
        assert_eq!(prompts.language, Language::Vietnamese);
        assert_eq!(
            prompts.summary,
            "Tóm tắt nội dung tài liệu sau một cách ngắn gọn, không quá 500 từ:"
        );
        assert_eq!(
            prompts.tags,
            "Dựa trên nội dung tài liệu, đề xuất 3-5 thẻ tag phù hợp:"
        );
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            PromptSet::for_code("fr"),
            Err(PromptError::UnsupportedLanguage("fr".to_string()))
        );
        assert!(PromptSet::for_code("EN").is_err());
    }

    #[test]
    fn test_prompt_layout() {
        let prompts = PromptSet::for_language(Language::English);
        assert_eq!(
            prompts.summary_prompt("BODY"),
            format!("{}\n\nBODY", prompts.summary)
        );
        assert_eq!(
            prompts.tags_prompt("BODY"),
            format!("{}\n\nBODY\n\n{}", prompts.tags, prompts.tags_output)
        );
    }
}
