//! HTML parsing for listing and article pages
//!
//! This module handles:
//! - Compiling the configured CSS selector chains
//! - Reading article links from a listing page
//! - Reading title, subtitle, date, body paragraphs and the main content
//!   container from an article page, each through an ordered fallback chain

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A link to an article as found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// Anchor text; may be empty
    pub title: String,

    /// Absolute article URL
    pub url: String,
}

/// Compiled selector chains
#[derive(Debug, Clone)]
pub struct ExtractionSelectors {
    pub listing_link: Selector,
    pub title: Vec<Selector>,
    pub subtitle: Vec<Selector>,
    pub date: Vec<Selector>,
    pub paragraphs: Vec<Selector>,
    pub main_content: Vec<Selector>,
}

impl ExtractionSelectors {
    /// Compiles every selector in the configuration
    ///
    /// Title and paragraph chains are mandatory and must not be empty.
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        if config.title.is_empty() || config.paragraphs.is_empty() {
            return Err(ConfigError::Validation(
                "selectors.title and selectors.paragraphs need at least one selector".to_string(),
            ));
        }

        Ok(Self {
            listing_link: compile_one(&config.listing_link)?,
            title: compile_chain(&config.title)?,
            subtitle: compile_chain(&config.subtitle)?,
            date: compile_chain(&config.date)?,
            paragraphs: compile_chain(&config.paragraphs)?,
            main_content: compile_chain(&config.main_content)?,
        })
    }
}

fn compile_one(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

fn compile_chain(selectors: &[String]) -> Result<Vec<Selector>, ConfigError> {
    selectors.iter().map(|s| compile_one(s)).collect()
}

/// Fields read from an article page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub subtitle: Option<String>,
    pub date: Option<String>,

    /// Non-empty, trimmed body paragraphs in document order
    pub paragraphs: Vec<String>,

    /// Full page markup as loaded
    pub raw_html: String,

    /// Outer markup of the main content container, or a synthetic wrapper
    /// around the paragraphs when no container matched
    pub main_content: String,
}

impl ExtractedArticle {
    /// Plain text body: one paragraph per line
    pub fn plain_text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

/// Extracts article links from a listing page
///
/// Anchors without an `href`, or whose `href` does not resolve to an
/// HTTP(S) URL, are ignored. Order follows the document.
///
/// # Example
///
/// ```
/// use muni_news_crawler::crawler::parse_listing_links;
/// use scraper::Selector;
/// use url::Url;
///
/// let html = r#"<div class="grupo-texto"><a href="/va/noticia/1">Festes</a></div>"#;
/// let base = Url::parse("https://www.lliria.es/va/noticias?page=0").unwrap();
/// let selector = Selector::parse("div.grupo-texto a").unwrap();
/// let links = parse_listing_links(html, &base, &selector);
/// assert_eq!(links[0].url, "https://www.lliria.es/va/noticia/1");
/// ```
pub fn parse_listing_links(html: &str, page_url: &Url, selector: &Selector) -> Vec<ArticleLink> {
    let document = Html::parse_document(html);

    document
        .select(selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let url = resolve_link(href, page_url)?;
            Some(ArticleLink {
                title: element_text(&element),
                url,
            })
        })
        .collect()
}

/// Resolves an href against the page URL, keeping only HTTP(S) targets
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:") || href.starts_with("mailto:") || href.starts_with("tel:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}

/// Extracts the article fields from a loaded article page
///
/// Returns `None` when the title or every body paragraph is missing; such
/// pages are skipped by the caller.
pub fn parse_article(html: &str, selectors: &ExtractionSelectors) -> Option<ExtractedArticle> {
    let document = Html::parse_document(html);

    let title = first_text(&document, &selectors.title)?;
    let paragraphs = first_paragraphs(&document, &selectors.paragraphs);
    if paragraphs.is_empty() {
        return None;
    }

    let subtitle = first_text(&document, &selectors.subtitle);
    let date = first_text(&document, &selectors.date);
    let main_content = first_outer_html(&document, &selectors.main_content)
        .unwrap_or_else(|| synthetic_content(&paragraphs));

    Some(ExtractedArticle {
        title,
        subtitle,
        date,
        paragraphs,
        raw_html: html.to_string(),
        main_content,
    })
}

/// Text of the first element matched by the first selector yielding text
fn first_text(document: &Html, chain: &[Selector]) -> Option<String> {
    chain.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty())
    })
}

/// Paragraph texts from the first selector that yields any
fn first_paragraphs(document: &Html, chain: &[Selector]) -> Vec<String> {
    for selector in chain {
        let paragraphs: Vec<String> = document
            .select(selector)
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty())
            .collect();
        if !paragraphs.is_empty() {
            return paragraphs;
        }
    }
    Vec::new()
}

fn first_outer_html(document: &Html, chain: &[Selector]) -> Option<String> {
    chain
        .iter()
        .find_map(|selector| document.select(selector).next().map(|element| element.html()))
}

/// Wraps already extracted paragraphs in a minimal container
fn synthetic_content(paragraphs: &[String]) -> String {
    let mut html = String::from("<div>");
    for paragraph in paragraphs {
        html.push_str("<p>");
        html.push_str(&html_escape::encode_text(paragraph));
        html.push_str("</p>");
    }
    html.push_str("</div>");
    html
}

/// Visible text of an element with whitespace runs collapsed
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> ExtractionSelectors {
        ExtractionSelectors::compile(&SelectorConfig::default()).unwrap()
    }

    fn base_url() -> Url {
        Url::parse("https://www.alboraya.es/va/noticias?page=0").unwrap()
    }

    const ARTICLE: &str = r#"
        <html><body>
          <div class="grupo-titulares">
            <div class="field-name-node-title"><h2>  Nou pressupost
              municipal </h2></div>
          </div>
          <div class="field-name-field-subtitulo"><div class="field__item">Aprovat pel ple</div></div>
          <div class="field__item"><time>12/03/2024</time></div>
          <div class="node__content">
            <div class="field__item">
              <p>Primer paràgraf.</p>
              <p>   </p>
              <p>Segon paràgraf.</p>
            </div>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_listing_links() {
        let html = r#"
            <div class="grupo-texto"><a href="/va/noticia/festes">Festes patronals</a></div>
            <div class="grupo-texto"><a href="https://www.alboraya.es/va/noticia/ple">Ple
                ordinari</a></div>
            <div class="altres"><a href="/va/altres">No</a></div>
        "#;
        let links = parse_listing_links(html, &base_url(), &selectors().listing_link);

        assert_eq!(
            links,
            vec![
                ArticleLink {
                    title: "Festes patronals".to_string(),
                    url: "https://www.alboraya.es/va/noticia/festes".to_string(),
                },
                ArticleLink {
                    title: "Ple ordinari".to_string(),
                    url: "https://www.alboraya.es/va/noticia/ple".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_listing_skips_unresolvable_anchors() {
        let html = r##"
            <div class="grupo-texto"><a>Sense enllaç</a></div>
            <div class="grupo-texto"><a href="#top">Amunt</a></div>
            <div class="grupo-texto"><a href="mailto:info@alboraya.es">Correu</a></div>
            <div class="grupo-texto"><a href="/va/noticia/1"></a></div>
        "##;
        let links = parse_listing_links(html, &base_url(), &selectors().listing_link);

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "");
    }

    #[test]
    fn test_empty_listing() {
        let links = parse_listing_links("<html></html>", &base_url(), &selectors().listing_link);
        assert!(links.is_empty());
    }

    #[test]
    fn test_parse_article_fields() {
        let article = parse_article(ARTICLE, &selectors()).unwrap();

        assert_eq!(article.title, "Nou pressupost municipal");
        assert_eq!(article.subtitle.as_deref(), Some("Aprovat pel ple"));
        assert_eq!(article.date.as_deref(), Some("12/03/2024"));
        assert_eq!(article.paragraphs, vec!["Primer paràgraf.", "Segon paràgraf."]);
        assert_eq!(article.plain_text(), "Primer paràgraf.\nSegon paràgraf.");
        assert!(article.main_content.starts_with("<div class=\"node__content\">"));
        assert_eq!(article.raw_html, ARTICLE);
    }

    #[test]
    fn test_missing_title_is_skipped() {
        let html = r#"<div class="field__item"><p>Text</p></div>"#;
        assert!(parse_article(html, &selectors()).is_none());
    }

    #[test]
    fn test_blank_title_is_skipped() {
        let html = r#"
            <div class="grupo-titulares"><div class="field-name-node-title"><h2>   </h2></div></div>
            <div class="node__content"><div class="field__item"><p>Text del cos.</p></div></div>
        "#;
        assert!(parse_article(html, &selectors()).is_none());
    }

    #[test]
    fn test_missing_paragraphs_is_skipped() {
        let html = r#"
            <div class="grupo-titulares"><div class="field-name-node-title"><h2>Títol</h2></div></div>
        "#;
        assert!(parse_article(html, &selectors()).is_none());
    }

    #[test]
    fn test_paragraph_fallback_selector() {
        let html = r#"
            <div class="grupo-titulares"><div class="field-name-node-title"><h2>Títol</h2></div></div>
            <section class="node__content"><p>Només aquí</p></section>
        "#;
        let article = parse_article(html, &selectors()).unwrap();

        assert_eq!(article.paragraphs, vec!["Només aquí"]);
        assert!(article.subtitle.is_none());
        assert!(article.date.is_none());
    }

    #[test]
    fn test_main_content_falls_back_to_synthetic_wrapper() {
        let html = r#"
            <div class="grupo-titulares"><div class="field-name-node-title"><h2>Títol</h2></div></div>
            <div class="field__item"><p>Preu < 5 € & més</p><p>Segon</p></div>
        "#;
        let article = parse_article(html, &selectors()).unwrap();

        assert_eq!(
            article.main_content,
            "<div><p>Preu &lt; 5 € &amp; més</p><p>Segon</p></div>"
        );
    }

    #[test]
    fn test_main_content_chain_order() {
        let html = r#"
            <div class="grupo-titulares"><div class="field-name-node-title"><h2>Títol</h2></div></div>
            <article><div class="field__item"><p>Cos</p></div></article>
        "#;
        let article = parse_article(html, &selectors()).unwrap();
        assert!(article.main_content.starts_with("<article>"));
    }

    #[test]
    fn test_compile_rejects_empty_title_chain() {
        let config = SelectorConfig {
            title: vec![],
            ..SelectorConfig::default()
        };
        assert!(ExtractionSelectors::compile(&config).is_err());
    }
}
