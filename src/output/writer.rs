//! Multi-format article writer
//!
//! Each article is stored three times under its site directory:
//!
//! ```text
//! {lang}/html/{date}/{slug}.html      full page markup
//! {lang}/plain/{date}/{slug}.txt      extracted paragraphs
//! {lang}/markdown/{date}/{slug}.md    main content as Markdown
//! {lang}/index.json                   entries of this language
//! index.json                          every entry of the site
//! ```
//!
//! Writes overwrite existing files, so re-running with the same slug and
//! date replaces the previous artifacts.

use crate::config::{LanguageConfig, OutputConfig, SiteConfig};
use crate::crawler::ExtractedArticle;
use crate::output::index::{ArticleRecord, CrawlIndex};
use crate::output::markdown::html_to_markdown;
use crate::Result;
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "index.json";

/// The three artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Html,
    Plain,
    Markdown,
}

impl Format {
    fn dir(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Plain => "plain",
            Format::Markdown => "markdown",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Plain => "txt",
            Format::Markdown => "md",
        }
    }
}

/// Article fields ready to be written, placeholders already applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDocument {
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub url: String,
    pub raw_html: String,
    pub plain_text: String,
    pub main_content: String,
}

impl ArticleDocument {
    /// Builds a document from extracted fields, filling missing subtitle and
    /// date with the configured placeholders
    pub fn from_extracted(article: ExtractedArticle, url: &str, output: &OutputConfig) -> Self {
        let plain_text = article.plain_text();
        Self {
            title: article.title,
            subtitle: article
                .subtitle
                .unwrap_or_else(|| output.missing_subtitle.clone()),
            date: article.date.unwrap_or_else(|| output.missing_date.clone()),
            url: url.to_string(),
            raw_html: article.raw_html,
            plain_text,
            main_content: article.main_content,
        }
    }
}

/// Writes articles and indexes for one site
#[derive(Debug, Clone)]
pub struct MultiFormatWriter {
    site_dir: PathBuf,
    date_stamp: String,
}

impl MultiFormatWriter {
    /// Writer rooted at `{root}/{site name}`
    pub fn new(root: &Path, site: &SiteConfig, date_stamp: &str) -> Self {
        Self {
            site_dir: root.join(&site.name),
            date_stamp: date_stamp.to_string(),
        }
    }

    pub fn date_stamp(&self) -> &str {
        &self.date_stamp
    }

    /// Writes the three artifacts of an article and returns its index record
    pub async fn persist(
        &self,
        document: &ArticleDocument,
        language: &LanguageConfig,
        slug: &str,
    ) -> Result<ArticleRecord> {
        let markdown = html_to_markdown(&document.main_content, &document.plain_text);

        let path_html = self
            .write_artifact(language, Format::Html, slug, &document.raw_html)
            .await?;
        let path_plain = self
            .write_artifact(language, Format::Plain, slug, &document.plain_text)
            .await?;
        let path_markdown = self
            .write_artifact(language, Format::Markdown, slug, &markdown)
            .await?;

        tracing::debug!(
            language = %language.code,
            "Saved {} as {}",
            document.url,
            slug
        );

        Ok(ArticleRecord {
            title: document.title.clone(),
            subtitle: document.subtitle.clone(),
            date: document.date.clone(),
            url: document.url.clone(),
            language_code: language.code.clone(),
            path_html,
            path_plain,
            path_markdown,
        })
    }

    /// Writes `{lang}/index.json` with the entries of one language
    pub async fn write_language_index(
        &self,
        index: &CrawlIndex,
        language: &LanguageConfig,
    ) -> Result<PathBuf> {
        let filtered = index.for_language(&language.code);
        let path = self.site_dir.join(language.dir_name()).join(INDEX_FILE);
        self.write_index(&filtered, &path).await?;

        tracing::info!(
            language = %language.code,
            "Language index written with {} entries: {}",
            filtered.len(),
            path.display()
        );
        Ok(path)
    }

    /// Writes the combined `index.json` at the site root
    pub async fn write_site_index(&self, index: &CrawlIndex) -> Result<PathBuf> {
        let path = self.site_dir.join(INDEX_FILE);
        self.write_index(index, &path).await?;

        tracing::info!(
            "Site index written with {} entries: {}",
            index.len(),
            path.display()
        );
        Ok(path)
    }

    async fn write_index(&self, index: &CrawlIndex, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, index.to_json()?).await?;
        Ok(())
    }

    /// Writes one artifact and returns its `/`-separated path relative to
    /// the site directory
    async fn write_artifact(
        &self,
        language: &LanguageConfig,
        format: Format,
        slug: &str,
        contents: &str,
    ) -> Result<String> {
        let lang_dir = language.dir_name();
        let file_name = format!("{}.{}", slug, format.extension());

        let dir = self
            .site_dir
            .join(&lang_dir)
            .join(format.dir())
            .join(&self.date_stamp);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), contents).await?;

        Ok(format!(
            "{}/{}/{}/{}",
            lang_dir,
            format.dir(),
            self.date_stamp,
            file_name
        ))
    }
}
