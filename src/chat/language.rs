//! Language detection for chat messages.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Language;

static CYRILLIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{0400}-\x{04FF}]").expect("Invalid Cyrillic regex pattern"));

static UZBEK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z]*'[a-z]|o'|g'|sh|ch|ng").expect("Invalid Uzbek regex pattern")
});

/// Guesses the language of a chat message.
///
/// Any Cyrillic character means Russian. Otherwise Uzbek Latin markers
/// (`o'`, `g'`, an apostrophe before a letter, or the digraphs `sh`, `ch`,
/// `ng`, case-insensitive) mean Uzbek. Everything else is English.
///
/// The digraph rule also matches much English text; callers that know the
/// user's language should pass it explicitly.
///
/// # Examples
///
/// ```rust
/// use moliyachi_client::chat::detect_language;
/// use moliyachi_client::domain::Language;
///
/// assert_eq!(detect_language("Что такое Moliyachi?"), Language::Ru);
/// assert_eq!(detect_language("Moliyachi nima? O'zbekcha"), Language::Uz);
/// assert_eq!(detect_language("Who is it for?"), Language::En);
/// ```
#[must_use]
pub fn detect_language(text: &str) -> Language {
    if CYRILLIC_PATTERN.is_match(text) {
        return Language::Ru;
    }
    if UZBEK_PATTERN.is_match(text) {
        return Language::Uz;
    }
    Language::En
}
