//! Filesystem-safe article identifiers
//!
//! A slug is derived from an article title and its 1-based position in the
//! language's link list. The same inputs always produce the same slug, so a
//! re-run overwrites earlier output instead of duplicating it.

use unicode_normalization::UnicodeNormalization;

/// Maximum length of the token part, before the `-{position}` suffix
pub const MAX_SLUG_TOKENS_LEN: usize = 50;

/// Tokens of this many characters or fewer are dropped
const MIN_TOKEN_LEN: usize = 3;

/// At most this many tokens are kept
const MAX_TOKENS: usize = 4;

/// Builds the slug for an article title at the given position
///
/// Titles without any token longer than three characters fall back to the
/// position zero-padded to three digits, with no suffix.
///
/// # Example
///
/// ```
/// use muni_news_crawler::slug;
///
/// assert_eq!(
///     slug("Ajuntament aprova el nou pressupost municipal", 7),
///     "ajuntament-aprova-pressupost-municipal-7"
/// );
/// assert_eq!(slug("   ", 4), "004");
/// ```
pub fn slug(title: &str, position: usize) -> String {
    if title.trim().is_empty() {
        return padded(position);
    }

    let normalized: String = title
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect::<String>()
        .to_lowercase();

    let tokens: Vec<&str> = normalized
        .split(|c: char| !is_word_char(c))
        .filter(|token| token.len() > MIN_TOKEN_LEN)
        .take(MAX_TOKENS)
        .collect();

    if tokens.is_empty() {
        return padded(position);
    }

    let mut joined = tokens.join("-");
    if joined.len() > MAX_SLUG_TOKENS_LEN {
        joined.truncate(MAX_SLUG_TOKENS_LEN);
        if let Some(last_dash) = joined.rfind('-') {
            if last_dash > 0 {
                joined.truncate(last_dash);
            }
        }
    }

    format!("{}-{}", joined, position)
}

fn padded(position: usize) -> String {
    format!("{:03}", position)
}

/// Marks in the Combining Diacritical Marks block (U+0300..=U+036F)
fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// ASCII word characters; everything else separates tokens
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
