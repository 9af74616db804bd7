//! HTML to Markdown conversion of an article's main content

/// Converts a main content fragment to Markdown
///
/// When the converter fails, `fallback` (the article's plain text) is
/// stored instead so the `.md` artifact always exists.
///
/// # Arguments
///
/// * `html` - Main content markup
/// * `fallback` - Text used if conversion fails
pub fn html_to_markdown(html: &str, fallback: &str) -> String {
    match htmd::convert(html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            tracing::warn!("Markdown conversion failed, storing plain text: {}", e);
            fallback.to_string()
        }
    }
}
