//! Language classification for extracted text.
//!
//! A diacritic-density heuristic separating Vietnamese from English. It is
//! deliberately not a general language detector.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Language;

/// Share of Vietnamese diacritic characters above which text counts as Vietnamese.
pub const VIETNAMESE_RATIO_THRESHOLD: f64 = 0.05;

/// Lowercase Vietnamese vowels with diacritics, plus đ; matched case-insensitively.
static VIETNAMESE_DIACRITICS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[àáạảãâầấậẩẫăằắặẳẵèéẹẻẽêềếệểễìíịỉĩòóọỏõôồốộổỗơờớợởỡùúụủũưừứựửữỳýỵỷỹđ]",
    )
    .unwrap()
});

/// Fraction of code points in `text` that are Vietnamese diacritics (0 for empty text).
pub fn diacritic_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    let matches = VIETNAMESE_DIACRITICS.find_iter(text).count();
    matches as f64 / total as f64
}

/// Classify text as Vietnamese or English.
pub fn classify(text: &str) -> Language {
    if diacritic_ratio(text) > VIETNAMESE_RATIO_THRESHOLD {
        Language::Vietnamese
    } else {
        Language::English
    }
}
